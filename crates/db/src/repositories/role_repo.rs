//! Repository for the `project_roles` table.

use sqlx::PgConnection;
use teamhub_core::types::DbId;
use teamhub_engine::records::NewRole;

use crate::models::role::ProjectRole;

const COLUMNS: &str = "id, project_id, name, count, skills, created_at, updated_at";

pub struct RoleRepo;

impl RoleRepo {
    /// Delete every role of the project and insert `roles` in order.
    pub async fn replace(
        conn: &mut PgConnection,
        project_id: DbId,
        roles: &[NewRole],
    ) -> Result<Vec<ProjectRole>, sqlx::Error> {
        sqlx::query("DELETE FROM project_roles WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;

        let query = format!(
            "INSERT INTO project_roles (project_id, name, count, skills) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let mut inserted = Vec::with_capacity(roles.len());
        for role in roles {
            let row = sqlx::query_as::<_, ProjectRole>(&query)
                .bind(project_id)
                .bind(&role.name)
                .bind(role.count)
                .bind(&role.skills)
                .fetch_one(&mut *conn)
                .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }

    /// Roles of a project in declaration order.
    pub async fn list_for_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<Vec<ProjectRole>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_roles WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, ProjectRole>(&query)
            .bind(project_id)
            .fetch_all(conn)
            .await
    }
}
