//! Project lifecycle, application review and completion consensus.
//!
//! [`ProjectEngine`] runs every operation inside one [`StorageTx`] and hands
//! queued notifications to a [`NotificationSink`] after commit.

pub mod applications;
pub mod completion;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod memory;
pub mod notify;
pub mod records;
pub mod reputation;

pub use applications::ApplicationDecision;
pub use completion::{CompletionOutcome, CompletionStatus, ConfirmOutcome};
pub use engine::{EngineConfig, ProjectEngine};
pub use error::{EngineError, EngineResult, StorageError};
pub use gateway::{StorageGateway, StorageTx};
pub use notify::{Notification, NotificationSink, NotifyError, NullSink, Outbox};
pub use reputation::{CompletionGrant, ReputationLedger};
