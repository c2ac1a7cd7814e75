//! HTTP adapter seam for building per-request services.
//!
//! Defines the factory trait handlers use to obtain service instances for the
//! calling session. The concrete implementations live in `crate::factory`
//! (the composition root).

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    board::Board,
    ports::inbound::{
        BoardService, DashboardService, DirectoryService, SessionService, TimeLogService,
    },
    SessionContext,
};

/// Factory trait for creating service instances bound to a session.
///
/// Services built for a session talk to the store with that session's
/// access token.
pub trait ServiceFactory: Send + Sync + 'static {
    fn session_service(&self) -> Box<dyn SessionService>;

    fn dashboard_service(&self, session: &SessionContext) -> Box<dyn DashboardService>;

    /// The board is owned by the caller and outlives the service.
    fn board_service(
        &self,
        session: &SessionContext,
        board: Arc<Mutex<Board>>,
    ) -> Box<dyn BoardService>;

    fn time_log_service(&self, session: &SessionContext) -> Box<dyn TimeLogService>;

    fn directory_service(&self, session: &SessionContext) -> Box<dyn DirectoryService>;
}
