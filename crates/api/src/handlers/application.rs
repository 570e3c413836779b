//! Handlers for applying to projects and reviewing applications.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use teamhub_core::status::ApplicationStatus;
use teamhub_core::types::DbId;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyRequest {
    #[validate(length(min = 1, max = 100))]
    pub role_name: String,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationStatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListParams {
    pub status: Option<ApplicationStatus>,
}

/// POST /api/v1/projects/{id}/applications
pub async fn apply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<ApplyRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let application = state
        .engine
        .apply(project_id, auth.user_id, input.role_name, input.answers)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: application })))
}

/// DELETE /api/v1/projects/{id}/applications/mine
///
/// Withdraw the caller's pending application. 204 on success.
pub async fn withdraw_application(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state
        .engine
        .withdraw_application(project_id, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/{id}/applications
///
/// Owner only. Optional `?status=PENDING` filter.
pub async fn list_applications(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<ApplicationListParams>,
) -> AppResult<impl IntoResponse> {
    let applications = state
        .engine
        .list_applications(project_id, auth.user_id, params.status)
        .await?;
    Ok(Json(DataResponse { data: applications }))
}

/// GET /api/v1/applications/mine
pub async fn my_applications(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let applications = state.engine.my_applications(auth.user_id).await?;
    Ok(Json(DataResponse { data: applications }))
}

/// PUT /api/v1/applications/{id}/status
///
/// Owner accepts or rejects. The response reports whether accepting this
/// applicant filled the last slot and closed the project.
pub async fn set_application_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(application_id): Path<DbId>,
    Json(input): Json<ApplicationStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let decision = state
        .engine
        .set_application_status(application_id, input.status, auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: decision }))
}
