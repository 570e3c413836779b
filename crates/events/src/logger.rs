//! Background task that traces every event on the bus.

use tokio::sync::broadcast;

use crate::bus::TeamEvent;

pub struct EventLogger;

impl EventLogger {
    /// Run until the bus is dropped.
    pub async fn run(mut receiver: broadcast::Receiver<TeamEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        kind = %event.kind,
                        project_id = ?event.project_id,
                        user_id = ?event.user_id,
                        "Event published"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, logger shutting down");
                    break;
                }
            }
        }
    }
}
