//! Inbox notification severities and link helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Info,
    Success,
    Warning,
}

impl Severity {
    /// Value stored in `notifications.severity`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-app link to a project page.
pub fn project_link(project_id: DbId) -> String {
    format!("/projects/{project_id}")
}

/// In-app link to a project's applicant list.
pub fn applications_link(project_id: DbId) -> String {
    format!("/projects/{project_id}/applications")
}
