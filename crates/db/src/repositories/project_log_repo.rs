//! Repository for the append-only `project_logs` table.

use sqlx::PgConnection;
use teamhub_core::status::ProjectStatus;
use teamhub_core::types::DbId;
use teamhub_engine::records::NewAuditEntry;

use crate::models::audit::ProjectLog;

const COLUMNS: &str = "\
    id, project_id, actor_id, action, old_status_id, new_status_id, details, created_at";

pub struct ProjectLogRepo;

impl ProjectLogRepo {
    pub async fn append(conn: &mut PgConnection, entry: &NewAuditEntry) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO project_logs \
                (project_id, actor_id, action, old_status_id, new_status_id, details, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7) \
             RETURNING id",
        )
        .bind(entry.project_id)
        .bind(entry.actor_id)
        .bind(entry.action)
        .bind(entry.old_status.map(ProjectStatus::id))
        .bind(entry.new_status.map(ProjectStatus::id))
        .bind(&entry.details)
        .bind(entry.created_at)
        .fetch_one(conn)
        .await
    }

    /// Whether the project has ever logged `action`.
    pub async fn exists(
        conn: &mut PgConnection,
        project_id: DbId,
        action: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM project_logs WHERE project_id = $1 AND action = $2)",
        )
        .bind(project_id)
        .bind(action)
        .fetch_one(conn)
        .await
    }

    /// History of a project, oldest first.
    pub async fn list_for_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Vec<ProjectLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_logs WHERE project_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, ProjectLog>(&query)
            .bind(project_id)
            .fetch_all(conn)
            .await
    }
}
