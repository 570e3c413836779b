use sqlx::FromRow;
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::records::RoleRecord;

/// A row from the `project_roles` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRole {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub count: i32,
    pub skills: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProjectRole> for RoleRecord {
    fn from(row: ProjectRole) -> Self {
        RoleRecord {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            count: row.count,
            skills: row.skills,
        }
    }
}
