use std::ops::Deref;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{app_state::AppState, domain::SessionContext, routes::ApiError};

/// A custom Axum extractor that resolves the caller's [`SessionContext`] from
/// the `Authorization: Bearer` header. Returns 401 Unauthorized when the
/// header is missing or the token is not accepted by the auth provider.
///
/// Safe to log: `SessionContext`'s `Debug` impl redacts the access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    session: SessionContext,
}

impl AuthUser {
    pub fn session(&self) -> &SessionContext {
        &self.session
    }
}

impl Deref for AuthUser {
    type Target = SessionContext;

    fn deref(&self) -> &Self::Target {
        &self.session
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::unauthorized("Not authenticated"))?;

        let session = state.resolve_session(bearer.token()).await?;
        Ok(AuthUser { session })
    }
}
