//! Repository for the `applications` table.

use sqlx::types::Json;
use sqlx::PgConnection;
use teamhub_core::status::ApplicationStatus;
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::records::NewApplication;

use crate::models::application::Application;

const COLUMNS: &str = "\
    id, project_id, user_id, role_name, status_id, answers, created_at, updated_at";

pub struct ApplicationRepo;

impl ApplicationRepo {
    /// Insert a `PENDING` application. Fails on `uq_applications_project_user`
    /// if the user already has one for this project.
    pub async fn create(
        conn: &mut PgConnection,
        input: &NewApplication,
        at: Timestamp,
    ) -> Result<Application, sqlx::Error> {
        let query = format!(
            "INSERT INTO applications \
                (project_id, user_id, role_name, status_id, answers, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .bind(&input.role_name)
            .bind(ApplicationStatus::Pending.id())
            .bind(Json(&input.answers))
            .bind(at)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Application>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM applications WHERE id = $1");
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn find_by_project_and_user(
        conn: &mut PgConnection,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Application>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM applications WHERE project_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Applications of a project in submission order.
    pub async fn list_for_project(
        conn: &mut PgConnection,
        project_id: DbId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM applications \
             WHERE project_id = $1 AND ($2::SMALLINT IS NULL OR status_id = $2) \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(project_id)
            .bind(status.map(ApplicationStatus::id))
            .fetch_all(conn)
            .await
    }

    /// Applications submitted by a user, newest first.
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: DbId,
    ) -> Result<Vec<Application>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM applications WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(user_id)
            .fetch_all(conn)
            .await
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: ApplicationStatus,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE applications SET status_id = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.id())
            .bind(at)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Hard-delete an application. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
