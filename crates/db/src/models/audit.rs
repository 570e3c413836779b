//! Project audit log rows.

use sqlx::FromRow;
use teamhub_core::error::CoreError;
use teamhub_core::status::{ProjectStatus, StatusId};
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::records::AuditEntry;

/// A row from the `project_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectLog {
    pub id: DbId,
    pub project_id: DbId,
    pub actor_id: Option<DbId>,
    pub action: String,
    pub old_status_id: Option<StatusId>,
    pub new_status_id: Option<StatusId>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

impl TryFrom<ProjectLog> for AuditEntry {
    type Error = CoreError;

    fn try_from(row: ProjectLog) -> Result<Self, Self::Error> {
        Ok(AuditEntry {
            id: row.id,
            project_id: row.project_id,
            actor_id: row.actor_id,
            action: row.action,
            old_status: row.old_status_id.map(ProjectStatus::from_id).transpose()?,
            new_status: row.new_status_id.map(ProjectStatus::from_id).transpose()?,
            details: row.details,
            created_at: row.created_at,
        })
    }
}
