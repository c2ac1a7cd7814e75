use serde::{Deserialize, Serialize};

use crate::{RestbaseClient, RestbaseError};

/// Tokens returned by a successful password sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub user: AuthUser,
}

/// The identity behind an access token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

impl RestbaseClient {
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Credentials, RestbaseError> {
        let url = self
            .base_url()
            .append_path("auth/v1/token")
            .with_pairs(vec![("grant_type".to_string(), "password".to_string())]);

        let request = self
            .http()
            .post(url.as_url().clone())
            .json(&PasswordGrant { email, password });

        let response = self.send(request, "POST auth/token").await?;
        response.json::<Credentials>().await.map_err(|e| {
            RestbaseError::Parsing(format!("Failed to parse sign-in response as JSON: {e}"))
        })
    }

    /// Resolve the user owning the client's access token.
    pub async fn get_user(&self) -> Result<AuthUser, RestbaseError> {
        if self.access_token().is_none() {
            return Err(RestbaseError::Unauthorized);
        }

        let url = self.base_url().append_path("auth/v1/user");
        let response = self
            .send(self.http().get(url.as_url().clone()), "GET auth/user")
            .await?;
        response.json::<AuthUser>().await.map_err(|e| {
            RestbaseError::Parsing(format!("Failed to parse user response as JSON: {e}"))
        })
    }

    pub async fn sign_out(&self) -> Result<(), RestbaseError> {
        if self.access_token().is_none() {
            return Ok(());
        }

        let url = self.base_url().append_path("auth/v1/logout");
        self.send(self.http().post(url.as_url().clone()), "POST auth/logout")
            .await?;
        Ok(())
    }
}
