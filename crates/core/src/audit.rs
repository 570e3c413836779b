//! Well-known project audit log actions and detail values.
//!
//! These must match the values stored in `project_logs.action` and the keys
//! written into `project_logs.details`.

pub const ACTION_CREATE: &str = "CREATE";
pub const ACTION_UPDATE: &str = "UPDATE";
pub const ACTION_STATUS_CHANGE: &str = "STATUS_CHANGE";
pub const ACTION_COMPLETION_REQUEST: &str = "COMPLETION_REQUEST";
pub const ACTION_COMPLETION: &str = "COMPLETION";

/// Completed by the owner alone because nobody else was on the team.
pub const METHOD_DIRECT: &str = "DIRECT";
/// Completed by majority vote.
pub const METHOD_CONSENSUS: &str = "CONSENSUS";

/// System transition caused by every role reaching its headcount.
pub const TRIGGER_ROLE_FILL: &str = "ROLE_FILL";
/// System transition caused by the application deadline passing.
pub const TRIGGER_DEADLINE: &str = "DEADLINE";
