//! Handlers for completion requests and confirmations.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use teamhub_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{id}/completion/request
///
/// Completes immediately when the owner has no team; otherwise asks the
/// accepted members to confirm.
pub async fn request_completion(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .request_completion(project_id, auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/projects/{id}/completion/confirm
pub async fn confirm_completion(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .confirm_completion(project_id, auth.user_id)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}

/// GET /api/v1/projects/{id}/completion
pub async fn completion_status(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let status = state.engine.completion_status(project_id).await?;
    Ok(Json(DataResponse { data: status }))
}
