//! Project rows.

use std::collections::BTreeSet;

use sqlx::FromRow;
use teamhub_core::error::CoreError;
use teamhub_core::status::{ProjectStatus, StatusId};
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::records::{ProjectKind, ProjectRecord};

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub status_id: StatusId,
    pub deadline: Option<Timestamp>,
    pub completion_requested: bool,
    pub completed_at: Option<Timestamp>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Combine the row with its completion votes.
    pub fn into_record(self, completion_votes: BTreeSet<DbId>) -> Result<ProjectRecord, CoreError> {
        let kind = ProjectKind::from_name(&self.kind)
            .ok_or_else(|| CoreError::Internal(format!("Unknown project kind '{}'", self.kind)))?;
        Ok(ProjectRecord {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            kind,
            status: ProjectStatus::from_id(self.status_id)?,
            deadline: self.deadline,
            completion_requested: self.completion_requested,
            completion_votes,
            completed_at: self.completed_at,
            metadata: self.metadata,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// One row of `project_completion_votes`.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CompletionVote {
    pub project_id: DbId,
    pub user_id: DbId,
}
