//! In-process events and the notification inbox.
//!
//! - [`EventBus`]: publish/subscribe hub backed by `tokio::sync::broadcast`.
//! - [`TeamEvent`]: the event envelope carried on the bus.
//! - [`InboxSink`]: the engine's notification sink; writes each
//!   notification to the `notifications` table and announces it on the bus.
//! - [`EventLogger`]: background task tracing every event.

pub mod bus;
pub mod inbox;
pub mod logger;

pub use bus::{EventBus, TeamEvent};
pub use inbox::InboxSink;
pub use logger::EventLogger;
