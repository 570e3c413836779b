//! Notification sink backed by the `notifications` table.

use std::sync::Arc;

use async_trait::async_trait;
use teamhub_db::repositories::NotificationRepo;
use teamhub_db::DbPool;
use teamhub_engine::notify::{Notification, NotificationSink, NotifyError};

use crate::bus::{EventBus, TeamEvent, NOTIFICATION_CREATED};

/// Writes each notification as an inbox row, then announces it on the bus.
///
/// Runs after the engine's transaction has committed, on its own pooled
/// connection; a failure here never undoes the operation.
pub struct InboxSink {
    pool: DbPool,
    bus: Arc<EventBus>,
}

impl InboxSink {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }
}

#[async_trait]
impl NotificationSink for InboxSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut conn = self.pool.acquire().await?;
        let row = NotificationRepo::create(&mut conn, notification).await?;

        let mut event = TeamEvent::new(NOTIFICATION_CREATED)
            .for_user(row.user_id)
            .with_payload(serde_json::to_value(&row)?);
        if let Some(project_id) = notification.project_id {
            event = event.for_project(project_id);
        }
        self.bus.publish(event);
        tracing::debug!(notification_id = row.id, user_id = row.user_id, "Notification stored");
        Ok(())
    }
}
