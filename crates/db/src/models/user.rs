use serde::Serialize;
use sqlx::FromRow;
use teamhub_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub completed_project_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
