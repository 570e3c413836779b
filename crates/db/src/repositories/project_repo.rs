//! Repositories for `projects` and `project_completion_votes`.

use std::collections::{BTreeMap, BTreeSet};

use sqlx::PgConnection;
use teamhub_core::status::ProjectStatus;
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::records::{NewProject, ProjectChanges};

use crate::models::project::{CompletionVote, Project};

/// Column list for `projects` queries.
const COLUMNS: &str = "\
    id, owner_id, title, description, kind, status_id, deadline, \
    completion_requested, completed_at, metadata, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn create(
        conn: &mut PgConnection,
        owner_id: DbId,
        input: &NewProject,
        at: Timestamp,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects \
                (owner_id, title, description, kind, status_id, deadline, metadata, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.kind.as_str())
            .bind(input.status.id())
            .bind(input.deadline)
            .bind(&input.metadata)
            .bind(at)
            .fetch_one(conn)
            .await
    }

    /// Load a project and row-lock it until the enclosing transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List projects newest first, optionally filtered by status.
    pub async fn list(
        conn: &mut PgConnection,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE ($1::SMALLINT IS NULL OR status_id = $1) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(status.map(ProjectStatus::id))
            .fetch_all(conn)
            .await
    }

    /// Ids of `OPEN` projects whose deadline is before `now`.
    pub async fn list_expired_open(
        conn: &mut PgConnection,
        now: Timestamp,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM projects \
             WHERE status_id = $1 AND deadline IS NOT NULL AND deadline < $2 \
             ORDER BY id",
        )
        .bind(ProjectStatus::Open.id())
        .bind(now)
        .fetch_all(conn)
        .await
    }

    /// Apply owner edits. `None` fields keep their current value; the
    /// deadline is written whenever the outer option is set, so it can be cleared.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        changes: &ProjectChanges,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        let deadline_provided = changes.deadline.is_some();
        let deadline = changes.deadline.flatten();

        sqlx::query(
            "UPDATE projects SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                kind = COALESCE($4, kind), \
                deadline = CASE WHEN $5 THEN $6 ELSE deadline END, \
                metadata = COALESCE($7, metadata), \
                updated_at = $8 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.kind.map(|k| k.as_str()))
        .bind(deadline_provided)
        .bind(deadline)
        .bind(&changes.metadata)
        .bind(at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: ProjectStatus,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET status_id = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.id())
            .bind(at)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn mark_completion_requested(
        conn: &mut PgConnection,
        id: DbId,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE projects SET completion_requested = TRUE, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn mark_completed(
        conn: &mut PgConnection,
        id: DbId,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE projects SET status_id = $2, completed_at = $3, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(ProjectStatus::Completed.id())
        .bind(at)
        .execute(conn)
        .await?;
        Ok(())
    }
}

pub struct CompletionVoteRepo;

impl CompletionVoteRepo {
    /// Record a vote. Returns `false` if it was already recorded.
    pub async fn add(
        conn: &mut PgConnection,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO project_completion_votes (project_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (project_id, user_id) DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_project(
        conn: &mut PgConnection,
        project_id: DbId,
    ) -> Result<BTreeSet<DbId>, sqlx::Error> {
        let voters = sqlx::query_scalar::<_, DbId>(
            "SELECT user_id FROM project_completion_votes WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(conn)
        .await?;
        Ok(voters.into_iter().collect())
    }

    /// Votes for several projects at once, keyed by project id.
    pub async fn list_for_projects(
        conn: &mut PgConnection,
        project_ids: &[DbId],
    ) -> Result<BTreeMap<DbId, BTreeSet<DbId>>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CompletionVote>(
            "SELECT project_id, user_id FROM project_completion_votes WHERE project_id = ANY($1)",
        )
        .bind(project_ids)
        .fetch_all(conn)
        .await?;

        let mut votes: BTreeMap<DbId, BTreeSet<DbId>> = BTreeMap::new();
        for row in rows {
            votes.entry(row.project_id).or_default().insert(row.user_id);
        }
        Ok(votes)
    }
}
