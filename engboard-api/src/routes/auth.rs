use axum::{extract::State, http::StatusCode, routing::get, routing::post, Json, Router};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{LoginResponse, ProfileResponse},
    app_state::AppState,
    auth::AuthUser,
};

use super::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Deserialize)]
pub struct LoginPayload {
    email: String,
    password: String,
}

// Hand-written so the password never ends up in a span.
impl std::fmt::Debug for LoginPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginPayload")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[instrument(name = "POST /auth/login", skip(app_state))]
async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = app_state
        .factory
        .session_service()
        .login(payload.email.trim(), &payload.password)
        .await?;

    let response = LoginResponse {
        access_token: session.access_token().to_string(),
        profile: ProfileResponse::from(&session),
    };
    app_state.remember_session(session).await;

    Ok(Json(response))
}

#[instrument(name = "POST /auth/logout", skip(app_state))]
async fn logout(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    // The local session goes away even if the provider call fails.
    app_state.forget_session(user.session()).await;
    app_state
        .factory
        .session_service()
        .logout(user.session())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "GET /auth/me")]
async fn me(user: AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(user.session()))
}
