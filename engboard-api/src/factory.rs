//! Composition root - concrete factories for creating service instances.
//!
//! This is the ONLY place that imports concrete outbound adapters and store types.

use std::sync::Arc;

use ::restbase::{RestbaseClient, RestbaseError};
use tokio::sync::Mutex;

use crate::{
    adapters::{
        inbound::http::ServiceFactory,
        outbound::{
            memory::InMemoryStore,
            restbase::{RestbaseAuth, RestbaseStore},
        },
    },
    config::{StoreBackend, StoreSettings},
    domain::{
        board::Board,
        ports::inbound::{
            BoardService, DashboardService, DirectoryService, SessionService, TimeLogService,
        },
        services::{
            BoardServiceImpl, DashboardServiceImpl, DirectoryServiceImpl, ScopedStore,
            SessionServiceImpl, TimeLogServiceImpl,
        },
        Clock, SessionContext,
    },
};

/// Build the factory for the configured store backend.
pub fn build(settings: &StoreSettings) -> Result<Arc<dyn ServiceFactory>, RestbaseError> {
    match settings.backend {
        StoreBackend::Memory => {
            tracing::info!("using the in-memory store with demo data");
            Ok(Arc::new(InMemoryServiceFactory::new(InMemoryStore::demo())))
        }
        StoreBackend::Restbase => {
            tracing::info!("using the remote store at {}", settings.url);
            let client = RestbaseClient::new(&settings.url, settings.api_key.clone())?;
            Ok(Arc::new(RestbaseServiceFactory::new(client)))
        }
    }
}

/// Factory backed by the remote store. Every service gets a client carrying
/// the caller's access token.
pub struct RestbaseServiceFactory {
    client: RestbaseClient,
}

impl RestbaseServiceFactory {
    pub fn new(client: RestbaseClient) -> Self {
        Self { client }
    }

    fn store_for(&self, session: &SessionContext) -> Arc<RestbaseStore> {
        Arc::new(RestbaseStore::new(
            self.client.with_access_token(session.access_token()),
        ))
    }
}

impl ServiceFactory for RestbaseServiceFactory {
    fn session_service(&self) -> Box<dyn SessionService> {
        let client = self.client.clone();
        let store_for: ScopedStore<RestbaseStore> = Arc::new(move |token: &str| {
            Arc::new(RestbaseStore::new(client.with_access_token(token)))
        });
        let auth = Arc::new(RestbaseAuth::new(self.client.clone()));
        Box::new(SessionServiceImpl::new(auth, store_for))
    }

    fn dashboard_service(&self, session: &SessionContext) -> Box<dyn DashboardService> {
        Box::new(DashboardServiceImpl::new(self.store_for(session)))
    }

    fn board_service(
        &self,
        session: &SessionContext,
        board: Arc<Mutex<Board>>,
    ) -> Box<dyn BoardService> {
        Box::new(BoardServiceImpl::new(self.store_for(session), board))
    }

    fn time_log_service(&self, session: &SessionContext) -> Box<dyn TimeLogService> {
        Box::new(TimeLogServiceImpl::new(self.store_for(session)))
    }

    fn directory_service(&self, session: &SessionContext) -> Box<dyn DirectoryService> {
        Box::new(DirectoryServiceImpl::new(self.store_for(session)))
    }
}

/// Factory sharing one in-memory store between all sessions.
pub struct InMemoryServiceFactory {
    store: Arc<InMemoryStore>,
    clock: Clock,
}

impl InMemoryServiceFactory {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store: Arc::new(store),
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl ServiceFactory for InMemoryServiceFactory {
    fn session_service(&self) -> Box<dyn SessionService> {
        let store = self.store.clone();
        let store_for: ScopedStore<InMemoryStore> = Arc::new(move |_: &str| store.clone());
        Box::new(SessionServiceImpl::new(self.store.clone(), store_for))
    }

    fn dashboard_service(&self, _session: &SessionContext) -> Box<dyn DashboardService> {
        Box::new(DashboardServiceImpl::new(self.store.clone()).with_clock(self.clock))
    }

    fn board_service(
        &self,
        _session: &SessionContext,
        board: Arc<Mutex<Board>>,
    ) -> Box<dyn BoardService> {
        Box::new(BoardServiceImpl::new(self.store.clone(), board))
    }

    fn time_log_service(&self, _session: &SessionContext) -> Box<dyn TimeLogService> {
        Box::new(TimeLogServiceImpl::new(self.store.clone()).with_clock(self.clock))
    }

    fn directory_service(&self, _session: &SessionContext) -> Box<dyn DirectoryService> {
        Box::new(DirectoryServiceImpl::new(self.store.clone()))
    }
}
