mod board;
mod dashboard;
mod directory;
mod session;
mod time_log;

pub use board::BoardServiceImpl;
pub use dashboard::DashboardServiceImpl;
pub use directory::DirectoryServiceImpl;
pub use session::{ScopedStore, SessionServiceImpl};
pub use time_log::TimeLogServiceImpl;

use itertools::Itertools;

use crate::domain::{
    models::{ProjectFilter, RecordFilter},
    ports::outbound::AllocationStore,
    StoreError,
};

/// Project listing filter matching an already-scoped record filter.
///
/// When the scope is pinned to an engineer, only projects that engineer is
/// allocated to are visible.
pub(crate) async fn project_scope<S: AllocationStore + ?Sized>(
    store: &S,
    scope: &RecordFilter,
) -> Result<ProjectFilter, StoreError> {
    let Some(engineer_id) = &scope.engineer_id else {
        return Ok(ProjectFilter::default());
    };

    let allocations = store
        .list_allocations(&RecordFilter::for_engineer(engineer_id.clone()))
        .await?;
    let ids = allocations
        .into_iter()
        .map(|a| a.project_id)
        .unique()
        .collect();

    Ok(ProjectFilter::default().with_ids(ids))
}
