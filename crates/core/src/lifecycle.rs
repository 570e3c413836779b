//! Project lifecycle state machine.
//!
//! Manual transitions are owner-initiated and must follow the table below.
//! System transitions (deadline expiry, full staffing) bypass the table but
//! never touch `COMPLETED`, which is terminal.

use chrono::Duration;

use crate::error::CoreError;
use crate::status::ProjectStatus;
use crate::types::Timestamp;

/// Days a `CLOSED` project may sit untouched before it becomes eligible for
/// removal by the external sweeper.
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Manual transitions
// ---------------------------------------------------------------------------

/// Returns the set of statuses an owner may move a project to from `from`.
///
/// Transition rules:
/// - `DRAFT`     -> `OPEN`
/// - `OPEN`      -> `FILLED`, `CLOSED`
/// - `FILLED`    -> `OPEN`, `CLOSED`
/// - `CLOSED`    -> `OPEN`, `FILLED`
/// - `COMPLETED` -> (none)
pub fn valid_transitions(from: ProjectStatus) -> &'static [ProjectStatus] {
    use crate::status::ProjectStatus::*;
    match from {
        Draft => &[Open],
        Open => &[Filled, Closed],
        Filled => &[Open, Closed],
        Closed => &[Open, Filled],
        Completed => &[],
    }
}

/// Check whether a manual transition from `from` to `to` is allowed.
pub fn can_transition(from: ProjectStatus, to: ProjectStatus) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a manual status transition.
pub fn validate_transition(from: ProjectStatus, to: ProjectStatus) -> Result<(), CoreError> {
    if can_transition(from, to) {
        return Ok(());
    }
    let allowed: Vec<&str> = valid_transitions(from).iter().map(|s| s.name()).collect();
    Err(CoreError::InvalidTransition(format!(
        "Cannot move project from {from} to {to}. Allowed: {allowed:?}"
    )))
}

/// A project may only be created as a draft or directly open.
pub fn validate_initial_status(status: ProjectStatus) -> Result<(), CoreError> {
    match status {
        ProjectStatus::Draft | ProjectStatus::Open => Ok(()),
        other => Err(CoreError::Validation(format!(
            "A new project must start as DRAFT or OPEN, got {other}"
        ))),
    }
}

pub fn is_terminal(status: ProjectStatus) -> bool {
    status == ProjectStatus::Completed
}

// ---------------------------------------------------------------------------
// Membership gates
// ---------------------------------------------------------------------------

/// New applications are only taken while the project is `OPEN`.
pub fn accepts_applications(status: ProjectStatus) -> bool {
    status == ProjectStatus::Open
}

/// Applicants may be accepted while the team is still forming.
pub fn accepts_members(status: ProjectStatus) -> bool {
    matches!(status, ProjectStatus::Open | ProjectStatus::Filled)
}

// ---------------------------------------------------------------------------
// System transitions
// ---------------------------------------------------------------------------

/// Full staffing closes a project only while it is `OPEN`.
pub fn can_auto_close(status: ProjectStatus) -> bool {
    status == ProjectStatus::Open
}

/// An `OPEN` project whose deadline has passed is due to close.
pub fn deadline_expired(status: ProjectStatus, deadline: Option<Timestamp>, now: Timestamp) -> bool {
    can_auto_close(status) && deadline.is_some_and(|d| d < now)
}

/// A `CLOSED` project untouched for longer than `retention` may be purged.
pub fn is_purge_eligible(
    status: ProjectStatus,
    updated_at: Timestamp,
    now: Timestamp,
    retention: Duration,
) -> bool {
    status == ProjectStatus::Closed && now - updated_at > retention
}
