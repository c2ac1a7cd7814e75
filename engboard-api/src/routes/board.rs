use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{BoardResponse, ProjectResponse, TaskResponse},
    app_state::AppState,
    auth::AuthUser,
    domain::{
        models::{EngineerId, ProjectId, TaskDraft, TaskId, TaskStatus},
        ports::inbound::BoardService,
    },
};

use super::{dashboard::ProjectFilterQuery, non_empty, parse_optional_date, ApiError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_board))
        .route("/projects", get(get_board_projects))
        .route("/tasks", post(create_task))
        .route("/tasks/:task_id", put(update_task))
        .route("/tasks/:task_id/status", put(move_task))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    title: String,
    description: Option<String>,
    project_id: String,
    engineer_id: Option<String>,
    #[serde(default)]
    estimated_hours: f64,
    deadline: Option<String>,
}

impl TryFrom<TaskPayload> for TaskDraft {
    type Error = ApiError;

    fn try_from(payload: TaskPayload) -> Result<Self, Self::Error> {
        Ok(TaskDraft {
            title: payload.title.trim().to_string(),
            description: non_empty(payload.description),
            project_id: ProjectId::new(payload.project_id),
            engineer_id: non_empty(payload.engineer_id).map(EngineerId::new),
            estimated_hours: payload.estimated_hours,
            deadline: parse_optional_date(payload.deadline.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct MovePayload {
    status: TaskStatus,
}

async fn board_service(app_state: &AppState, user: &AuthUser) -> Box<dyn BoardService> {
    let board = app_state.board_for(user.user_id()).await;
    app_state.factory.board_service(user.session(), board)
}

#[instrument(name = "GET /board", skip(app_state))]
async fn get_board(
    user: AuthUser,
    State(app_state): State<AppState>,
    Query(query): Query<ProjectFilterQuery>,
) -> Result<Json<BoardResponse>, ApiError> {
    let service = board_service(&app_state, &user).await;
    let project_id = query.project_id();
    let view = service.load(user.session(), project_id.as_ref()).await?;
    Ok(Json(view.into()))
}

#[instrument(name = "GET /board/projects", skip(app_state))]
async fn get_board_projects(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let service = board_service(&app_state, &user).await;
    let projects = service.projects(user.session()).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

#[instrument(name = "POST /board/tasks", skip(app_state))]
async fn create_task(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<TaskPayload>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let draft = TaskDraft::try_from(payload)?;
    let service = board_service(&app_state, &user).await;
    let task = service.create_task(user.session(), draft).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

#[instrument(name = "PUT /board/tasks/:task_id", skip(app_state))]
async fn update_task(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(task_id): Path<String>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<TaskResponse>, ApiError> {
    let draft = TaskDraft::try_from(payload)?;
    let service = board_service(&app_state, &user).await;
    let task = service
        .update_task(user.session(), &TaskId::new(task_id), draft)
        .await?;
    Ok(Json(task.into()))
}

#[instrument(name = "PUT /board/tasks/:task_id/status", skip(app_state))]
async fn move_task(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(task_id): Path<String>,
    Json(payload): Json<MovePayload>,
) -> Result<Json<BoardResponse>, ApiError> {
    let service = board_service(&app_state, &user).await;
    let view = service
        .move_task(user.session(), &TaskId::new(task_id), payload.status)
        .await?;
    Ok(Json(view.into()))
}
