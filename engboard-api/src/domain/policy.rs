//! Role-based access rules.
//!
//! Row-level restriction is applied by rewriting the query before it reaches
//! the store, so a caller can never forget to filter the results afterwards.

use super::{
    models::{EngineerId, RecordFilter, Role},
    AccessError,
};

pub struct AccessPolicy;

impl AccessPolicy {
    /// Restrict `base` to what `role` may read.
    ///
    /// Engineers only see rows tied to their own engineer record; an engineer
    /// without a linked record gets an error rather than an unscoped query.
    /// Admins and managers get `base` back unchanged.
    pub fn scope_query(
        base: RecordFilter,
        role: Role,
        engineer_id: Option<&EngineerId>,
    ) -> Result<RecordFilter, AccessError> {
        match role {
            Role::Engineer => {
                let engineer_id = engineer_id.ok_or(AccessError::UnlinkedEngineer)?;
                Ok(base.with_engineer(Some(engineer_id.clone())))
            }
            Role::Admin | Role::Manager => Ok(base),
        }
    }

    pub fn can_view_costs(role: Role) -> bool {
        role.is_privileged()
    }

    pub fn require_privileged(role: Role, action: &'static str) -> Result<(), AccessError> {
        if role.is_privileged() {
            Ok(())
        } else {
            Err(AccessError::Forbidden(action))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ProjectId;

    #[test]
    fn engineer_query_is_forced_to_own_id() {
        let me = EngineerId::new("e-me");
        let base = RecordFilter::for_project("p1").with_engineer(Some(EngineerId::new("e-other")));

        let scoped = AccessPolicy::scope_query(base, Role::Engineer, Some(&me)).unwrap();

        assert_eq!(scoped.engineer_id, Some(me));
        assert_eq!(scoped.project_id, Some(ProjectId::new("p1")));
    }

    #[test]
    fn unlinked_engineer_is_rejected() {
        let result = AccessPolicy::scope_query(RecordFilter::default(), Role::Engineer, None);
        assert_eq!(result, Err(AccessError::UnlinkedEngineer));
    }

    #[test]
    fn managers_and_admins_pass_through() {
        let base = RecordFilter::for_engineer("e2");
        for role in [Role::Admin, Role::Manager] {
            let scoped = AccessPolicy::scope_query(base.clone(), role, None).unwrap();
            assert_eq!(scoped, base);
        }
    }

    #[test]
    fn cost_visibility() {
        assert!(AccessPolicy::can_view_costs(Role::Admin));
        assert!(AccessPolicy::can_view_costs(Role::Manager));
        assert!(!AccessPolicy::can_view_costs(Role::Engineer));
    }

    #[test]
    fn privileged_actions_reject_engineers() {
        assert!(AccessPolicy::require_privileged(Role::Manager, "editing clients").is_ok());
        assert_eq!(
            AccessPolicy::require_privileged(Role::Engineer, "editing clients"),
            Err(AccessError::Forbidden("editing clients"))
        );
    }
}
