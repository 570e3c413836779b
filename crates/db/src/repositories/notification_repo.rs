//! Repository for the `notifications` inbox table.

use sqlx::PgConnection;
use teamhub_core::types::DbId;
use teamhub_engine::notify::Notification;

use crate::models::notification::NotificationRow;

const COLUMNS: &str = "id, user_id, message, severity, link, is_read, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(
        conn: &mut PgConnection,
        notification: &Notification,
    ) -> Result<NotificationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (user_id, message, severity, link) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(notification.user_id)
            .bind(&notification.message)
            .bind(notification.severity.as_str())
            .bind(&notification.link)
            .fetch_one(conn)
            .await
    }

    /// A user's inbox, newest first.
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE user_id = $1 AND (NOT $2 OR is_read = FALSE) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(user_id)
            .bind(unread_only)
            .bind(limit)
            .bind(offset)
            .fetch_all(conn)
            .await
    }

    /// Mark one of the user's notifications read. Returns `false` if it does
    /// not exist or belongs to someone else.
    pub async fn mark_read(conn: &mut PgConnection, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
