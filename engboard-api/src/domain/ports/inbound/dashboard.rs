use async_trait::async_trait;

use crate::domain::{
    aggregation::UtilizationOverview,
    models::{Dashboard, ProjectId, ProjectOverview},
    DashboardError, SessionContext,
};

/// Inbound port for the aggregated read views.
#[async_trait]
pub trait DashboardService: Send + Sync + 'static {
    /// KPIs and chart series, optionally narrowed to one project.
    async fn dashboard(
        &self,
        session: &SessionContext,
        project_id: Option<&ProjectId>,
    ) -> Result<Dashboard, DashboardError>;

    /// Per-engineer utilization across in-progress projects. Admin/manager only.
    async fn allocation_overview(
        &self,
        session: &SessionContext,
    ) -> Result<UtilizationOverview, DashboardError>;

    /// Detail view of a single project.
    async fn project_overview(
        &self,
        session: &SessionContext,
        project_id: &ProjectId,
    ) -> Result<ProjectOverview, DashboardError>;
}
