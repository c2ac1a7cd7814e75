use std::fmt;

use super::{
    models::{EngineerId, Profile, RecordFilter, Role, UserId},
    AccessError, AccessPolicy,
};

/// Everything a request needs to know about who is calling.
///
/// Built once at sign-in (or on the first request carrying a token) and passed
/// explicitly to every service call.
#[derive(Clone, PartialEq)]
pub struct SessionContext {
    access_token: String,
    profile: Profile,
    engineer_id: Option<EngineerId>,
}

impl SessionContext {
    pub fn new(
        access_token: impl Into<String>,
        profile: Profile,
        engineer_id: Option<EngineerId>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            profile,
            engineer_id,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn user_id(&self) -> &UserId {
        &self.profile.id
    }

    pub fn role(&self) -> Role {
        self.profile.role
    }

    pub fn engineer_id(&self) -> Option<&EngineerId> {
        self.engineer_id.as_ref()
    }

    pub fn is_engineer(&self) -> bool {
        self.role() == Role::Engineer
    }

    pub fn can_view_costs(&self) -> bool {
        AccessPolicy::can_view_costs(self.role())
    }

    /// Apply the access policy to `base` for this session.
    pub fn scope(&self, base: RecordFilter) -> Result<RecordFilter, AccessError> {
        AccessPolicy::scope_query(base, self.role(), self.engineer_id())
    }

    pub fn require_privileged(&self, action: &'static str) -> Result<(), AccessError> {
        AccessPolicy::require_privileged(self.role(), action)
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.profile.id)
            .field("role", &self.profile.role)
            .field("engineer_id", &self.engineer_id)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_token() {
        let session = SessionContext::new(
            "secret-token",
            Profile::new("u1", "Ana", "ana@example.com", Role::Engineer),
            Some(EngineerId::new("e1")),
        );
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("e1"));
    }
}
