pub mod application;
pub mod health;
pub mod notification;
pub mod project;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires a bearer token.
///
/// ```text
/// /projects                                   list, create
/// /projects/{id}                              detail, update
/// /projects/{id}/status                       owner status change
/// /projects/{id}/history                      audit log (owner)
/// /projects/{id}/applications                 list (owner), apply
/// /projects/{id}/applications/mine            withdraw
/// /projects/{id}/completion                   tally
/// /projects/{id}/completion/request           request completion (owner)
/// /projects/{id}/completion/confirm           confirm completion
///
/// /applications/mine                          caller's applications
/// /applications/{id}/status                   accept / reject (owner)
///
/// /users/{id}/reputation                      completed count and badges
///
/// /notifications                              caller's inbox
/// /notifications/{id}/read                    mark read
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/applications", application::router())
        .nest("/users", user::router())
        .nest("/notifications", notification::router())
}
