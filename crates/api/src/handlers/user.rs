use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use teamhub_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users/{id}/reputation
pub async fn reputation(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state.engine.reputation(user_id).await?;
    Ok(Json(DataResponse { data: record }))
}
