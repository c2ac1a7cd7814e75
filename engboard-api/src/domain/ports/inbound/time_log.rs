use async_trait::async_trait;

use crate::domain::{
    models::{
        HourEntry, HourEntryId, HourEntryRequest, HoursHistory, HoursReport, Project, ProjectId,
        ReportFilter, Task,
    },
    SessionContext, TimeLogError,
};

/// Inbound port for logging hours and reporting on them.
#[async_trait]
pub trait TimeLogService: Send + Sync + 'static {
    /// Latest entries visible to the caller plus the caller's total for today.
    async fn history(&self, session: &SessionContext) -> Result<HoursHistory, TimeLogError>;

    /// In-progress projects the caller can log against.
    async fn loggable_projects(&self, session: &SessionContext)
        -> Result<Vec<Project>, TimeLogError>;

    /// Tasks of a project that can receive hours (todo, doing or review).
    async fn loggable_tasks(
        &self,
        session: &SessionContext,
        project_id: &ProjectId,
    ) -> Result<Vec<Task>, TimeLogError>;

    /// Validate and store an entry. Fails before any write when no engineer
    /// can be resolved or the hours are not positive.
    async fn log_hours(
        &self,
        session: &SessionContext,
        request: HourEntryRequest,
    ) -> Result<HourEntry, TimeLogError>;

    async fn delete_entry(
        &self,
        session: &SessionContext,
        entry_id: &HourEntryId,
    ) -> Result<(), TimeLogError>;

    /// Entries in a date range, oldest first, with their total.
    async fn report(
        &self,
        session: &SessionContext,
        filter: ReportFilter,
    ) -> Result<HoursReport, TimeLogError>;
}
