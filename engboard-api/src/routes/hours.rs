use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        HourEntryResponse, HoursHistoryResponse, HoursReportResponse, ProjectResponse,
        TaskResponse,
    },
    app_state::AppState,
    auth::AuthUser,
    domain::models::{
        EngineerId, HourEntryId, HourEntryRequest, HourType, ProjectId, ReportFilter, TaskId,
    },
};

use super::{non_empty, parse_date, parse_optional_date, ApiError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_history).post(log_hours))
        .route("/:entry_id", delete(delete_entry))
        .route("/report", get(get_report))
        .route("/projects", get(get_loggable_projects))
        .route("/projects/:project_id/tasks", get(get_loggable_tasks))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogHoursPayload {
    engineer_id: Option<String>,
    project_id: String,
    task_id: Option<String>,
    date: String,
    hours: f64,
    #[serde(default)]
    hour_type: HourType,
    note: Option<String>,
}

impl TryFrom<LogHoursPayload> for HourEntryRequest {
    type Error = ApiError;

    fn try_from(payload: LogHoursPayload) -> Result<Self, Self::Error> {
        Ok(HourEntryRequest {
            engineer_id: non_empty(payload.engineer_id).map(EngineerId::new),
            project_id: ProjectId::new(payload.project_id),
            task_id: non_empty(payload.task_id).map(TaskId::new),
            date: parse_date(&payload.date)?,
            hours: payload.hours,
            hour_type: payload.hour_type,
            note: payload.note,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    from: Option<String>,
    to: Option<String>,
    project_id: Option<String>,
    engineer_id: Option<String>,
}

impl TryFrom<ReportQuery> for ReportFilter {
    type Error = ApiError;

    fn try_from(query: ReportQuery) -> Result<Self, Self::Error> {
        Ok(ReportFilter {
            from: parse_optional_date(query.from.as_deref())?,
            to: parse_optional_date(query.to.as_deref())?,
            project_id: non_empty(query.project_id).map(ProjectId::new),
            engineer_id: non_empty(query.engineer_id).map(EngineerId::new),
        })
    }
}

#[instrument(name = "GET /hours", skip(app_state))]
async fn get_history(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<HoursHistoryResponse>, ApiError> {
    let history = app_state
        .factory
        .time_log_service(user.session())
        .history(user.session())
        .await?;
    Ok(Json(history.into()))
}

#[instrument(name = "POST /hours", skip(app_state))]
async fn log_hours(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<LogHoursPayload>,
) -> Result<(StatusCode, Json<HourEntryResponse>), ApiError> {
    let request = HourEntryRequest::try_from(payload)?;
    let entry = app_state
        .factory
        .time_log_service(user.session())
        .log_hours(user.session(), request)
        .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

#[instrument(name = "DELETE /hours/:entry_id", skip(app_state))]
async fn delete_entry(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .factory
        .time_log_service(user.session())
        .delete_entry(user.session(), &HourEntryId::new(entry_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "GET /hours/report", skip(app_state))]
async fn get_report(
    user: AuthUser,
    State(app_state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<HoursReportResponse>, ApiError> {
    let filter = ReportFilter::try_from(query)?;
    let report = app_state
        .factory
        .time_log_service(user.session())
        .report(user.session(), filter)
        .await?;
    Ok(Json(report.into()))
}

#[instrument(name = "GET /hours/projects", skip(app_state))]
async fn get_loggable_projects(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = app_state
        .factory
        .time_log_service(user.session())
        .loggable_projects(user.session())
        .await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

#[instrument(name = "GET /hours/projects/:project_id/tasks", skip(app_state))]
async fn get_loggable_tasks(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = app_state
        .factory
        .time_log_service(user.session())
        .loggable_tasks(user.session(), &ProjectId::new(project_id))
        .await?;
    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}
