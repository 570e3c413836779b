//! Handlers for the `/projects` resource: creation, edits, listing and
//! owner-driven status changes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Deserializer};
use teamhub_core::status::ProjectStatus;
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::records::{NewProject, NewRole, ProjectChanges, ProjectKind};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RoleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 1))]
    pub count: i32,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl From<RoleRequest> for NewRole {
    fn from(r: RoleRequest) -> Self {
        NewRole {
            name: r.name,
            count: r.count,
            skills: r.skills,
        }
    }
}

/// Body of `POST /projects`. `status` defaults to `DRAFT`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub kind: ProjectKind,
    pub status: Option<ProjectStatus>,
    pub deadline: Option<Timestamp>,
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    #[validate(nested)]
    pub roles: Vec<RoleRequest>,
}

/// Body of `PUT /projects/{id}`. Absent fields are left unchanged; `roles`
/// replaces the whole set and `"deadline": null` clears the deadline.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<ProjectKind>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub deadline: Option<Option<Timestamp>>,
    pub metadata: Option<serde_json::Value>,
    #[validate(nested)]
    pub roles: Option<Vec<RoleRequest>>,
}

/// Keeps an explicit `null` apart from an absent field.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct ProjectStatusRequest {
    pub status: ProjectStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<ProjectStatus>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
pub async fn create_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let new_project = NewProject {
        title: input.title,
        description: input.description,
        kind: input.kind,
        status: input.status.unwrap_or(ProjectStatus::Draft),
        deadline: input.deadline,
        metadata: input
            .metadata
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        roles: input.roles.into_iter().map(NewRole::from).collect(),
    };
    let view = state.engine.create_project(auth.user_id, new_project).await?;

    tracing::info!(project_id = view.project.id, user_id = auth.user_id, "Project created via API");
    Ok((StatusCode::CREATED, Json(DataResponse { data: view })))
}

/// GET /api/v1/projects
///
/// Optional `?status=OPEN` filter. Expired `OPEN` projects are closed
/// before the list is read.
pub async fn list_projects(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<impl IntoResponse> {
    let projects = state.engine.list_projects(params.status).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let view = state.engine.project_detail(project_id).await?;
    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/projects/{id}
pub async fn update_project(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<UpdateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let changes = ProjectChanges {
        title: input.title,
        description: input.description,
        kind: input.kind,
        deadline: input.deadline,
        metadata: input.metadata,
        roles: input
            .roles
            .map(|roles| roles.into_iter().map(NewRole::from).collect()),
    };
    let view = state
        .engine
        .update_project(project_id, auth.user_id, changes)
        .await?;

    Ok(Json(DataResponse { data: view }))
}

/// PUT /api/v1/projects/{id}/status
pub async fn set_project_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<ProjectStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let project = state
        .engine
        .set_project_status(project_id, input.status, auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: project }))
}

/// GET /api/v1/projects/{id}/history
pub async fn project_history(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entries = state.engine.project_history(project_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: entries }))
}
