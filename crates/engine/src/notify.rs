//! Best-effort notification delivery.
//!
//! Operations collect notifications in an [`Outbox`] while their transaction
//! is open and hand them to the [`NotificationSink`] only after commit. A
//! failed send is logged and dropped; it never fails the operation.

use async_trait::async_trait;
use serde::Serialize;
use teamhub_core::notification::Severity;
use teamhub_core::types::DbId;

pub type NotifyError = Box<dyn std::error::Error + Send + Sync>;

/// A message for one user's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub user_id: DbId,
    pub message: String,
    pub severity: Severity,
    pub link: Option<String>,
    /// Project the message is about; not stored in the inbox row.
    #[serde(skip)]
    pub project_id: Option<DbId>,
}

impl Notification {
    pub fn new(user_id: DbId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            severity,
            link: None,
            project_id: None,
        }
    }

    pub fn for_project(mut self, project_id: DbId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Sink that discards everything.
pub struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Notifications queued by an operation, delivered after commit.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<Notification>,
}

impl Outbox {
    pub fn push(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Send every queued notification. Failures are logged and swallowed.
    pub async fn deliver(self, sink: &dyn NotificationSink) {
        for notification in &self.pending {
            if let Err(e) = sink.send(notification).await {
                tracing::warn!(
                    error = %e,
                    user_id = notification.user_id,
                    "Failed to deliver notification"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
            Err("inbox offline".into())
        }
    }

    #[test]
    fn new_outbox_is_empty() {
        let mut outbox = Outbox::default();
        assert!(outbox.is_empty());

        outbox.push(Notification::new(1, Severity::Info, "hello").for_project(7));
        assert!(!outbox.is_empty());
        assert_eq!(outbox.len(), 1);
    }

    #[tokio::test]
    async fn delivery_failures_are_swallowed() {
        let mut outbox = Outbox::default();
        outbox.push(Notification::new(1, Severity::Info, "first"));
        outbox.push(Notification::new(2, Severity::Warning, "second"));

        outbox.deliver(&FailingSink).await;
    }
}
