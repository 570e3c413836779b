//! Repository layer: one unit struct per table group.
//!
//! Every method takes a `&mut PgConnection` so it can run inside a
//! transaction or on a pooled connection alike.

pub mod application_repo;
pub mod notification_repo;
pub mod project_log_repo;
pub mod project_repo;
pub mod role_repo;
pub mod user_repo;

pub use application_repo::ApplicationRepo;
pub use notification_repo::NotificationRepo;
pub use project_log_repo::ProjectLogRepo;
pub use project_repo::{CompletionVoteRepo, ProjectRepo};
pub use role_repo::RoleRepo;
pub use user_repo::{BadgeRepo, UserRepo};
