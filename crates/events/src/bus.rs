//! Broadcast bus for [`TeamEvent`]s, shared as `Arc<EventBus>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use teamhub_core::types::DbId;

/// A notification row was written to a user's inbox.
pub const NOTIFICATION_CREATED: &str = "notification.created";

/// Something that happened to a project or a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamEvent {
    /// Dot-separated name, e.g. `"notification.created"`.
    pub kind: String,
    pub project_id: Option<DbId>,
    /// User the event concerns (the notification recipient, for inbox events).
    pub user_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl TeamEvent {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            project_id: None,
            user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            at: Utc::now(),
        }
    }

    pub fn for_project(mut self, project_id: DbId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn for_user(mut self, user_id: DbId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus. Slow receivers that fall more than the channel
/// capacity behind observe `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<TeamEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to every current subscriber. Returns how many received it;
    /// zero subscribers is not an error.
    pub fn publish(&self, event: TeamEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TeamEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_inbox_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let delivered = bus.publish(
            TeamEvent::new(NOTIFICATION_CREATED)
                .for_project(12)
                .for_user(3)
                .with_payload(serde_json::json!({ "severity": "INFO" })),
        );
        assert_eq!(delivered, 1);

        let event = rx.recv().await.expect("should receive the event");
        assert_eq!(event.kind, NOTIFICATION_CREATED);
        assert_eq!(event.project_id, Some(12));
        assert_eq!(event.user_id, Some(3));
        assert_eq!(event.payload["severity"], "INFO");
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        assert_eq!(bus.publish(TeamEvent::new("project.closed")), 2);

        assert_eq!(first.recv().await.unwrap().kind, "project.closed");
        assert_eq!(second.recv().await.unwrap().kind, "project.closed");
    }

    #[test]
    fn publishing_without_subscribers_reports_zero() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(TeamEvent::new("nobody.listening")), 0);
    }
}
