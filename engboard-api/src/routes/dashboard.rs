use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        AllocationOverviewResponse, DashboardResponse, ProjectOverviewResponse,
    },
    app_state::AppState,
    auth::AuthUser,
    domain::models::ProjectId,
};

use super::{non_empty, ApiError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/allocations", get(get_allocation_overview))
        .route("/projects/:id/overview", get(get_project_overview))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilterQuery {
    pub project_id: Option<String>,
}

impl ProjectFilterQuery {
    pub fn project_id(self) -> Option<ProjectId> {
        non_empty(self.project_id).map(ProjectId::new)
    }
}

#[instrument(name = "GET /dashboard", skip(app_state))]
async fn get_dashboard(
    user: AuthUser,
    State(app_state): State<AppState>,
    Query(query): Query<ProjectFilterQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let service = app_state.factory.dashboard_service(user.session());
    let project_id = query.project_id();
    let dashboard = service
        .dashboard(user.session(), project_id.as_ref())
        .await?;
    Ok(Json(dashboard.into()))
}

#[instrument(name = "GET /allocations", skip(app_state))]
async fn get_allocation_overview(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<AllocationOverviewResponse>, ApiError> {
    let overview = app_state
        .factory
        .dashboard_service(user.session())
        .allocation_overview(user.session())
        .await?;
    Ok(Json(overview.into()))
}

#[instrument(name = "GET /projects/:id/overview", skip(app_state))]
async fn get_project_overview(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectOverviewResponse>, ApiError> {
    let overview = app_state
        .factory
        .dashboard_service(user.session())
        .project_overview(user.session(), &ProjectId::new(project_id))
        .await?;
    Ok(Json(overview.into()))
}
