//! Route definitions for the `/applications` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::application;
use crate::state::AppState;

/// Routes mounted at `/applications`.
///
/// ```text
/// GET  /mine          -> my_applications
/// PUT  /{id}/status   -> set_application_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(application::my_applications))
        .route("/{id}/status", put(application::set_application_status))
}
