use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    models::UserId,
    ports::{
        inbound::SessionService,
        outbound::{AuthProvider, EngineerStore, ProfileStore},
    },
    SessionContext, SessionError, StoreError,
};

/// Builds a store that acts on behalf of the given access token.
pub type ScopedStore<S> = Arc<dyn Fn(&str) -> Arc<S> + Send + Sync>;

/// Implementation of the SessionService inbound port.
///
/// Profile and engineer lookups go through a store opened with the caller's
/// own token, so the remote row-level rules see the real user.
pub struct SessionServiceImpl<A: AuthProvider, S: ProfileStore + EngineerStore> {
    auth: Arc<A>,
    store_for: ScopedStore<S>,
}

impl<A: AuthProvider, S: ProfileStore + EngineerStore> SessionServiceImpl<A, S> {
    pub fn new(auth: Arc<A>, store_for: ScopedStore<S>) -> Self {
        Self { auth, store_for }
    }

    async fn build_context(
        &self,
        access_token: &str,
        user_id: &UserId,
    ) -> Result<SessionContext, SessionError> {
        let store = (self.store_for)(access_token);
        let (profile, engineer) = tokio::try_join!(
            store.get_profile(user_id),
            store.find_engineer_by_user(user_id),
        )?;

        let profile = profile.ok_or(SessionError::ProfileMissing)?;
        Ok(SessionContext::new(
            access_token,
            profile,
            engineer.map(|e| e.id),
        ))
    }
}

#[async_trait]
impl<A: AuthProvider, S: ProfileStore + EngineerStore> SessionService for SessionServiceImpl<A, S> {
    async fn login(&self, email: &str, password: &str) -> Result<SessionContext, SessionError> {
        let grant = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(|e| match e {
                StoreError::Unauthorized => SessionError::InvalidCredentials,
                other => SessionError::Store(other),
            })?;

        let session = self.build_context(&grant.access_token, &grant.user_id).await?;
        tracing::info!(user_id = %grant.user_id, role = ?session.role(), "user signed in");
        Ok(session)
    }

    async fn resolve(&self, access_token: &str) -> Result<SessionContext, SessionError> {
        let user_id = self
            .auth
            .current_user(access_token)
            .await
            .map_err(|e| match e {
                StoreError::Unauthorized => SessionError::NotAuthenticated,
                other => SessionError::Store(other),
            })?;

        self.build_context(access_token, &user_id).await
    }

    async fn logout(&self, session: &SessionContext) -> Result<(), SessionError> {
        self.auth.sign_out(session.access_token()).await?;
        tracing::info!(user_id = %session.user_id(), "user signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::memory::InMemoryStore,
        domain::models::{Engineer, EngineerId, Profile, Role},
    };

    fn service(store: InMemoryStore) -> SessionServiceImpl<InMemoryStore, InMemoryStore> {
        let store = Arc::new(store);
        let scoped = store.clone();
        SessionServiceImpl::new(store, Arc::new(move |_| scoped.clone()))
    }

    fn engineer_linked_to(user: &str) -> Engineer {
        Engineer {
            id: EngineerId::new("e1"),
            name: "Ana Souza".to_string(),
            email: Some("ana@example.com".to_string()),
            specialty: None,
            level: None,
            normal_rate: 100.0,
            overtime_rate: 150.0,
            availability: 100.0,
            user_id: Some(UserId::new(user)),
        }
    }

    #[tokio::test]
    async fn login_builds_context_with_linked_engineer() {
        let store = InMemoryStore::new()
            .with_user(
                Profile::new("u1", "Ana", "ana@example.com", Role::Engineer),
                "secret",
            )
            .with_engineers(vec![engineer_linked_to("u1")]);
        let service = service(store);

        let session = service.login("ana@example.com", "secret").await.unwrap();

        assert_eq!(session.role(), Role::Engineer);
        assert_eq!(session.engineer_id(), Some(&EngineerId::new("e1")));

        let resolved = service.resolve(session.access_token()).await.unwrap();
        assert_eq!(resolved, session);
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let store = InMemoryStore::new().with_user(
            Profile::new("u1", "Ana", "ana@example.com", Role::Manager),
            "secret",
        );

        let err = service(store)
            .login("ana@example.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_token_is_not_authenticated() {
        let err = service(InMemoryStore::new())
            .resolve("made-up")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn logout_invalidates_token() {
        let store = InMemoryStore::new().with_user(
            Profile::new("u1", "Gil", "gil@example.com", Role::Admin),
            "pw",
        );
        let service = service(store);
        let session = service.login("gil@example.com", "pw").await.unwrap();

        service.logout(&session).await.unwrap();

        assert!(service.resolve(session.access_token()).await.is_err());
    }
}
