//! Routes for the reference data: clients, engineers, projects and the
//! allocations tying engineers to projects.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    adapters::inbound::http::{
        AllocationResponse, ClientResponse, EngineerResponse, ProjectResponse, TeamMemberResponse,
    },
    app_state::AppState,
    auth::AuthUser,
    domain::models::{
        AllocationId, AllocationInput, ClientId, ClientInput, EngineerId, EngineerInput,
        ProjectId, ProjectInput, ProjectStatus,
    },
};

use super::{non_empty, parse_optional_date, ApiError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/:id", put(update_client).delete(delete_client))
        .route("/engineers", get(list_engineers).post(create_engineer))
        .route(
            "/engineers/:id",
            put(update_engineer).delete(delete_engineer),
        )
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", put(update_project).delete(delete_project))
        .route("/projects/:id/team", get(project_team).post(allocate))
        .route("/allocations/:id", delete(remove_allocation))
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    name: String,
    tax_id: Option<String>,
    contact: Option<String>,
    email: Option<String>,
}

impl From<ClientPayload> for ClientInput {
    fn from(payload: ClientPayload) -> Self {
        ClientInput {
            name: payload.name.trim().to_string(),
            tax_id: non_empty(payload.tax_id),
            contact: non_empty(payload.contact),
            email: non_empty(payload.email),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerPayload {
    name: String,
    email: Option<String>,
    specialty: Option<String>,
    level: Option<String>,
    #[serde(default)]
    normal_rate: f64,
    #[serde(default)]
    overtime_rate: f64,
    #[serde(default)]
    availability: f64,
}

impl From<EngineerPayload> for EngineerInput {
    fn from(payload: EngineerPayload) -> Self {
        EngineerInput {
            name: payload.name.trim().to_string(),
            email: non_empty(payload.email),
            specialty: non_empty(payload.specialty),
            level: non_empty(payload.level),
            normal_rate: payload.normal_rate,
            overtime_rate: payload.overtime_rate,
            availability: payload.availability,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    name: String,
    client_id: Option<String>,
    status: Option<ProjectStatus>,
    #[serde(default)]
    estimated_hours: f64,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl TryFrom<ProjectPayload> for ProjectInput {
    type Error = ApiError;

    fn try_from(payload: ProjectPayload) -> Result<Self, Self::Error> {
        Ok(ProjectInput {
            name: payload.name.trim().to_string(),
            client_id: non_empty(payload.client_id).map(ClientId::new),
            status: payload.status.unwrap_or(ProjectStatus::Planning),
            estimated_hours: payload.estimated_hours,
            start_date: parse_optional_date(payload.start_date.as_deref())?,
            end_date: parse_optional_date(payload.end_date.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPayload {
    engineer_id: String,
    percent: f64,
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[instrument(name = "GET /clients", skip(app_state))]
async fn list_clients(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let clients = app_state
        .factory
        .directory_service(user.session())
        .clients(user.session())
        .await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

#[instrument(name = "POST /clients", skip(app_state))]
async fn create_client(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let client = app_state
        .factory
        .directory_service(user.session())
        .create_client(user.session(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

#[instrument(name = "PUT /clients/:id", skip(app_state))]
async fn update_client(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ClientPayload>,
) -> Result<StatusCode, ApiError> {
    app_state
        .factory
        .directory_service(user.session())
        .update_client(user.session(), &ClientId::new(id), payload.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "DELETE /clients/:id", skip(app_state))]
async fn delete_client(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .factory
        .directory_service(user.session())
        .delete_client(user.session(), &ClientId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Engineers
// ---------------------------------------------------------------------------

#[instrument(name = "GET /engineers", skip(app_state))]
async fn list_engineers(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<EngineerResponse>>, ApiError> {
    let engineers = app_state
        .factory
        .directory_service(user.session())
        .engineers(user.session())
        .await?;
    let show_costs = user.can_view_costs();
    Ok(Json(
        engineers
            .into_iter()
            .map(|engineer| EngineerResponse::new(engineer, show_costs))
            .collect(),
    ))
}

#[instrument(name = "POST /engineers", skip(app_state))]
async fn create_engineer(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<EngineerPayload>,
) -> Result<(StatusCode, Json<EngineerResponse>), ApiError> {
    let engineer = app_state
        .factory
        .directory_service(user.session())
        .create_engineer(user.session(), payload.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(EngineerResponse::new(engineer, user.can_view_costs())),
    ))
}

#[instrument(name = "PUT /engineers/:id", skip(app_state))]
async fn update_engineer(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EngineerPayload>,
) -> Result<StatusCode, ApiError> {
    app_state
        .factory
        .directory_service(user.session())
        .update_engineer(user.session(), &EngineerId::new(id), payload.into())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "DELETE /engineers/:id", skip(app_state))]
async fn delete_engineer(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .factory
        .directory_service(user.session())
        .delete_engineer(user.session(), &EngineerId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Projects and allocations
// ---------------------------------------------------------------------------

#[instrument(name = "GET /projects", skip(app_state))]
async fn list_projects(
    user: AuthUser,
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = app_state
        .factory
        .directory_service(user.session())
        .projects(user.session())
        .await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

#[instrument(name = "POST /projects", skip(app_state))]
async fn create_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    Json(payload): Json<ProjectPayload>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let input = ProjectInput::try_from(payload)?;
    let project = app_state
        .factory
        .directory_service(user.session())
        .create_project(user.session(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

#[instrument(name = "PUT /projects/:id", skip(app_state))]
async fn update_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ProjectPayload>,
) -> Result<StatusCode, ApiError> {
    let input = ProjectInput::try_from(payload)?;
    app_state
        .factory
        .directory_service(user.session())
        .update_project(user.session(), &ProjectId::new(id), input)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "DELETE /projects/:id", skip(app_state))]
async fn delete_project(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .factory
        .directory_service(user.session())
        .delete_project(user.session(), &ProjectId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "GET /projects/:id/team", skip(app_state))]
async fn project_team(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TeamMemberResponse>>, ApiError> {
    let team = app_state
        .factory
        .directory_service(user.session())
        .project_team(user.session(), &ProjectId::new(id))
        .await?;
    Ok(Json(team.into_iter().map(Into::into).collect()))
}

#[instrument(name = "POST /projects/:id/team", skip(app_state))]
async fn allocate(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AllocationPayload>,
) -> Result<(StatusCode, Json<AllocationResponse>), ApiError> {
    let input = AllocationInput {
        engineer_id: EngineerId::new(payload.engineer_id),
        project_id: ProjectId::new(id),
        percent: payload.percent,
    };
    let allocation = app_state
        .factory
        .directory_service(user.session())
        .allocate(user.session(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(allocation.into())))
}

#[instrument(name = "DELETE /allocations/:id", skip(app_state))]
async fn remove_allocation(
    user: AuthUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .factory
        .directory_service(user.session())
        .remove_allocation(user.session(), &AllocationId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
