use async_trait::async_trait;

use crate::domain::{models::UserId, StoreError};

/// Result of a successful password sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthGrant {
    pub access_token: String,
    pub user_id: UserId,
}

/// Outbound port for the hosted auth provider.
#[async_trait]
pub trait AuthProvider: Send + Sync + 'static {
    /// Exchange email and password for an access token.
    ///
    /// Returns `StoreError::Unauthorized` for wrong credentials.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, StoreError>;

    /// Resolve the user behind an access token.
    async fn current_user(&self, access_token: &str) -> Result<UserId, StoreError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError>;
}
