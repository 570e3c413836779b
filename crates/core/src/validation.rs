//! Boundary validation for free-form request payloads.
//!
//! Screening answers and project metadata arrive as loosely shaped data; they
//! are checked here once so the engine only ever sees well-formed values.

use std::collections::{BTreeMap, HashSet};

use crate::error::CoreError;
use crate::role_fill::DeclaredRole;

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_ROLE_NAME_LENGTH: usize = 100;
pub const MAX_ROLES: usize = 20;
pub const MAX_ANSWERS: usize = 50;
pub const MAX_ANSWER_LENGTH: usize = 5_000;

pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Project title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Project title exceeds {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Roles must have unique, non-empty names and a headcount of at least one.
pub fn validate_roles<R: DeclaredRole>(roles: &[R]) -> Result<(), CoreError> {
    if roles.len() > MAX_ROLES {
        return Err(CoreError::Validation(format!(
            "A project may declare at most {MAX_ROLES} roles"
        )));
    }
    let mut seen = HashSet::new();
    for role in roles {
        let name = role.role_name();
        if name.trim().is_empty() {
            return Err(CoreError::Validation("Role name must not be empty".into()));
        }
        if name.chars().count() > MAX_ROLE_NAME_LENGTH {
            return Err(CoreError::Validation(format!(
                "Role name '{name}' exceeds {MAX_ROLE_NAME_LENGTH} characters"
            )));
        }
        if role.headcount() < 1 {
            return Err(CoreError::Validation(format!(
                "Role '{name}' must have a headcount of at least 1"
            )));
        }
        if !seen.insert(name) {
            return Err(CoreError::Validation(format!("Duplicate role name '{name}'")));
        }
    }
    Ok(())
}

pub fn validate_answers(answers: &BTreeMap<String, String>) -> Result<(), CoreError> {
    if answers.len() > MAX_ANSWERS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_ANSWERS} screening answers are allowed"
        )));
    }
    for (question, answer) in answers {
        if question.trim().is_empty() {
            return Err(CoreError::Validation(
                "Screening answer keys must not be empty".into(),
            ));
        }
        if answer.chars().count() > MAX_ANSWER_LENGTH {
            return Err(CoreError::Validation(format!(
                "Answer to '{question}' exceeds {MAX_ANSWER_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Metadata must be a JSON object (possibly empty).
pub fn validate_metadata(metadata: &serde_json::Value) -> Result<(), CoreError> {
    if metadata.is_object() {
        Ok(())
    } else {
        Err(CoreError::Validation("Project metadata must be a JSON object".into()))
    }
}
