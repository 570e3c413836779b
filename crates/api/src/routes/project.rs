//! Route definitions for the `/projects` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{application, completion, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET, POST   /                            -> list_projects, create_project
/// GET, PUT    /{id}                        -> get_project, update_project
/// PUT         /{id}/status                 -> set_project_status
/// GET         /{id}/history                -> project_history
/// GET, POST   /{id}/applications           -> list_applications, apply
/// DELETE      /{id}/applications/mine      -> withdraw_application
/// GET         /{id}/completion             -> completion_status
/// POST        /{id}/completion/request     -> request_completion
/// POST        /{id}/completion/confirm     -> confirm_completion
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list_projects).post(project::create_project))
        .route("/{id}", get(project::get_project).put(project::update_project))
        .route("/{id}/status", put(project::set_project_status))
        .route("/{id}/history", get(project::project_history))
        .route(
            "/{id}/applications",
            get(application::list_applications).post(application::apply),
        )
        .route("/{id}/applications/mine", delete(application::withdraw_application))
        .route("/{id}/completion", get(completion::completion_status))
        .route("/{id}/completion/request", post(completion::request_completion))
        .route("/{id}/completion/confirm", post(completion::confirm_completion))
}
