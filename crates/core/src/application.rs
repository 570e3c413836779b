//! Application review rules.
//!
//! Owners decide on applications; applicants may only withdraw while their
//! application is still pending.

use crate::error::CoreError;
use crate::status::ApplicationStatus;

/// Returns the statuses an owner may move an application to from `from`.
///
/// - `PENDING`  -> `ACCEPTED`, `REJECTED`
/// - `ACCEPTED` -> `REJECTED` (removing a member)
/// - `REJECTED` -> `ACCEPTED` (reconsidering)
pub fn valid_transitions(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    use crate::status::ApplicationStatus::*;
    match from {
        Pending => &[Accepted, Rejected],
        Accepted => &[Rejected],
        Rejected => &[Accepted],
    }
}

/// Owners may only decide, never reset an application to pending.
pub fn validate_decision(target: ApplicationStatus) -> Result<(), CoreError> {
    match target {
        ApplicationStatus::Accepted | ApplicationStatus::Rejected => Ok(()),
        ApplicationStatus::Pending => Err(CoreError::Validation(
            "An application can only be set to ACCEPTED or REJECTED".to_string(),
        )),
    }
}

/// Validate an owner decision against the application's current status.
pub fn validate_transition(
    current: ApplicationStatus,
    target: ApplicationStatus,
) -> Result<(), CoreError> {
    validate_decision(target)?;
    if valid_transitions(current).contains(&target) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition(format!(
            "Application is already {current} and cannot become {target}"
        )))
    }
}

/// Only a pending application can be withdrawn by its applicant.
pub fn validate_withdrawal(current: ApplicationStatus) -> Result<(), CoreError> {
    if current == ApplicationStatus::Pending {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition(format!(
            "Only PENDING applications can be withdrawn (application is {current})"
        )))
    }
}
