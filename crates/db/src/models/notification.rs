use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use teamhub_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationRow {
    pub id: DbId,
    pub user_id: DbId,
    pub message: String,
    pub severity: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// Query parameters for listing a user's inbox.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationListParams {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
