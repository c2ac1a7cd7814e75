use async_trait::async_trait;

use crate::domain::{SessionContext, SessionError};

/// Inbound port for sign-in and session resolution.
#[async_trait]
pub trait SessionService: Send + Sync + 'static {
    /// Sign in with email and password and build the session context.
    async fn login(&self, email: &str, password: &str) -> Result<SessionContext, SessionError>;

    /// Rebuild the session context for an access token issued earlier.
    async fn resolve(&self, access_token: &str) -> Result<SessionContext, SessionError>;

    async fn logout(&self, session: &SessionContext) -> Result<(), SessionError>;
}
