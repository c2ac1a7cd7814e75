use std::{sync::Arc, time::Duration};

use moka::future::Cache;
use tokio::sync::Mutex;

use crate::{
    adapters::inbound::http::ServiceFactory,
    domain::{board::Board, models::UserId, SessionContext, SessionError},
};

const MAX_SESSIONS: u64 = 2_000;
const SESSION_TTL: Duration = Duration::from_secs(5 * 60);
const BOARD_IDLE: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
pub struct AppState {
    pub factory: Arc<dyn ServiceFactory>,
    /// Sessions already resolved, keyed by access token. Expired entries are
    /// resolved again with the auth provider, so revoked tokens and changed
    /// profiles are picked up.
    sessions: Cache<String, SessionContext>,
    /// One board per signed-in user, kept across requests. Dropped on logout
    /// or once nobody has touched it for a while.
    boards: Cache<UserId, Arc<Mutex<Board>>>,
}

impl AppState {
    pub fn new(factory: Arc<dyn ServiceFactory>) -> Self {
        Self::with_session_ttl(factory, SESSION_TTL)
    }

    pub fn with_session_ttl(factory: Arc<dyn ServiceFactory>, ttl: Duration) -> Self {
        Self {
            factory,
            sessions: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_live(ttl)
                .build(),
            boards: Cache::builder()
                .max_capacity(MAX_SESSIONS)
                .time_to_idle(BOARD_IDLE)
                .build(),
        }
    }

    /// Session for an access token, asking the auth provider when it is not
    /// cached or the cached entry has expired.
    pub async fn resolve_session(&self, access_token: &str) -> Result<SessionContext, SessionError> {
        if let Some(session) = self.sessions.get(access_token).await {
            return Ok(session);
        }

        let session = self.factory.session_service().resolve(access_token).await?;
        self.remember_session(session.clone()).await;
        Ok(session)
    }

    pub async fn remember_session(&self, session: SessionContext) {
        self.sessions
            .insert(session.access_token().to_string(), session)
            .await;
    }

    /// Drop the cached session and the user's board.
    pub async fn forget_session(&self, session: &SessionContext) {
        self.sessions.invalidate(session.access_token()).await;
        self.boards.invalidate(session.user_id()).await;
    }

    pub async fn board_for(&self, user_id: &UserId) -> Arc<Mutex<Board>> {
        self.boards
            .get_with(user_id.clone(), async { Arc::new(Mutex::new(Board::new())) })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::memory::InMemoryStore,
        domain::{
            models::{Engineer, EngineerId, Profile, Role},
            ports::outbound::AuthProvider,
        },
        factory::InMemoryServiceFactory,
    };

    const SHORT_TTL: Duration = Duration::from_millis(50);

    fn state(store: &InMemoryStore) -> AppState {
        let factory = InMemoryServiceFactory::new(store.clone());
        AppState::with_session_ttl(Arc::new(factory), SHORT_TTL)
    }

    async fn login(state: &AppState, email: &str, password: &str) -> SessionContext {
        let session = state
            .factory
            .session_service()
            .login(email, password)
            .await
            .unwrap();
        state.remember_session(session.clone()).await;
        session
    }

    async fn wait_past_ttl() {
        tokio::time::sleep(SHORT_TTL * 3).await;
    }

    #[tokio::test]
    async fn revoked_token_stops_resolving_once_the_cache_expires() {
        let store = InMemoryStore::demo();
        let state = state(&store);
        let session = login(&state, "ana@engboard.local", "ana").await;
        assert!(state.resolve_session(session.access_token()).await.is_ok());

        store.sign_out(session.access_token()).await.unwrap();
        wait_past_ttl().await;

        let err = state
            .resolve_session(session.access_token())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn engineer_linked_after_login_is_picked_up() {
        let store = InMemoryStore::new().with_user(
            Profile::new("u1", "Caio", "caio@example.com", Role::Engineer),
            "pw",
        );
        let state = state(&store);
        let session = login(&state, "caio@example.com", "pw").await;
        assert_eq!(session.engineer_id(), None);

        let _ = store.clone().with_engineers(vec![Engineer {
            id: EngineerId::new("e-caio"),
            name: "Caio".to_string(),
            email: Some("caio@example.com".to_string()),
            specialty: None,
            level: None,
            normal_rate: 90.0,
            overtime_rate: 135.0,
            availability: 100.0,
            user_id: Some(UserId::new("u1")),
        }]);
        wait_past_ttl().await;

        let resolved = state.resolve_session(session.access_token()).await.unwrap();
        assert_eq!(resolved.engineer_id(), Some(&EngineerId::new("e-caio")));
    }

    #[tokio::test]
    async fn forgetting_a_session_drops_the_board() {
        let store = InMemoryStore::demo();
        let state = state(&store);
        let session = login(&state, "gestor@engboard.local", "gestor").await;

        let board = state.board_for(session.user_id()).await;
        assert!(Arc::ptr_eq(&board, &state.board_for(session.user_id()).await));

        state.forget_session(&session).await;

        assert!(!Arc::ptr_eq(&board, &state.board_for(session.user_id()).await));
    }
}
