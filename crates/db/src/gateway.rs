//! PostgreSQL implementation of the engine's storage traits.
//!
//! Each [`PgTx`] wraps one database transaction. `lock_project` takes a
//! `FOR UPDATE` row lock, so concurrent operations on the same project
//! serialize on that row until the first transaction ends.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use teamhub_core::error::CoreError;
use teamhub_core::status::{ApplicationStatus, ProjectStatus};
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::error::StorageError;
use teamhub_engine::gateway::{StorageGateway, StorageTx};
use teamhub_engine::records::{
    ApplicationRecord, AuditEntry, NewApplication, NewAuditEntry, NewProject, NewRole,
    ProjectChanges, ProjectRecord, ReputationRecord, RoleRecord,
};

use crate::models::application::Application;
use crate::repositories::{
    ApplicationRepo, BadgeRepo, CompletionVoteRepo, ProjectLogRepo, ProjectRepo, RoleRepo,
    UserRepo,
};

/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a driver error, keeping unique-constraint violations distinguishable.
fn storage_err(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StorageError::UniqueViolation(constraint);
        }
    }
    StorageError::backend(err)
}

/// A stored row that no longer decodes into a domain value.
fn decode_err(err: CoreError) -> StorageError {
    StorageError::backend(err)
}

fn applications(rows: Vec<Application>) -> Result<Vec<ApplicationRecord>, StorageError> {
    rows.into_iter()
        .map(|row| ApplicationRecord::try_from(row).map_err(decode_err))
        .collect()
}

#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StorageGateway for PgGateway {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, StorageError> {
        let tx = self.pool.begin().await.map_err(storage_err)?;
        Ok(PgTx { tx })
    }
}

pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StorageTx for PgTx {
    // --- users & reputation ---

    async fn user_exists(&mut self, user_id: DbId) -> Result<bool, StorageError> {
        UserRepo::exists(&mut self.tx, user_id).await.map_err(storage_err)
    }

    async fn reputation(
        &mut self,
        user_id: DbId,
    ) -> Result<Option<ReputationRecord>, StorageError> {
        let Some(user) = UserRepo::find_by_id(&mut self.tx, user_id)
            .await
            .map_err(storage_err)?
        else {
            return Ok(None);
        };
        let badges = BadgeRepo::list_for_user(&mut self.tx, user_id)
            .await
            .map_err(storage_err)?;
        Ok(Some(ReputationRecord {
            user_id,
            completed_project_count: user.completed_project_count,
            badges: badges.into_iter().collect(),
        }))
    }

    async fn increment_completed_count(
        &mut self,
        user_id: DbId,
    ) -> Result<Option<i32>, StorageError> {
        UserRepo::increment_completed_count(&mut self.tx, user_id)
            .await
            .map_err(storage_err)
    }

    async fn add_badge(&mut self, user_id: DbId, badge: &str) -> Result<bool, StorageError> {
        BadgeRepo::add(&mut self.tx, user_id, badge)
            .await
            .map_err(storage_err)
    }

    // --- projects ---

    async fn insert_project(
        &mut self,
        owner_id: DbId,
        input: &NewProject,
        at: Timestamp,
    ) -> Result<ProjectRecord, StorageError> {
        let row = ProjectRepo::create(&mut self.tx, owner_id, input, at)
            .await
            .map_err(storage_err)?;
        row.into_record(BTreeSet::new()).map_err(decode_err)
    }

    async fn lock_project(
        &mut self,
        project_id: DbId,
    ) -> Result<Option<ProjectRecord>, StorageError> {
        let Some(row) = ProjectRepo::find_for_update(&mut self.tx, project_id)
            .await
            .map_err(storage_err)?
        else {
            return Ok(None);
        };
        let votes = CompletionVoteRepo::list_for_project(&mut self.tx, project_id)
            .await
            .map_err(storage_err)?;
        row.into_record(votes).map(Some).map_err(decode_err)
    }

    async fn list_projects(
        &mut self,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<ProjectRecord>, StorageError> {
        let rows = ProjectRepo::list(&mut self.tx, status)
            .await
            .map_err(storage_err)?;
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut votes = CompletionVoteRepo::list_for_projects(&mut self.tx, &ids)
            .await
            .map_err(storage_err)?;

        rows.into_iter()
            .map(|row| {
                let project_votes = votes.remove(&row.id).unwrap_or_default();
                row.into_record(project_votes).map_err(decode_err)
            })
            .collect()
    }

    async fn list_expired_open(&mut self, now: Timestamp) -> Result<Vec<DbId>, StorageError> {
        ProjectRepo::list_expired_open(&mut self.tx, now)
            .await
            .map_err(storage_err)
    }

    async fn update_project(
        &mut self,
        project_id: DbId,
        changes: &ProjectChanges,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        ProjectRepo::update(&mut self.tx, project_id, changes, at)
            .await
            .map_err(storage_err)
    }

    async fn set_project_status(
        &mut self,
        project_id: DbId,
        status: ProjectStatus,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        ProjectRepo::set_status(&mut self.tx, project_id, status, at)
            .await
            .map_err(storage_err)
    }

    async fn mark_completion_requested(
        &mut self,
        project_id: DbId,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        ProjectRepo::mark_completion_requested(&mut self.tx, project_id, at)
            .await
            .map_err(storage_err)
    }

    async fn add_completion_vote(
        &mut self,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, StorageError> {
        CompletionVoteRepo::add(&mut self.tx, project_id, user_id)
            .await
            .map_err(storage_err)
    }

    async fn mark_completed(&mut self, project_id: DbId, at: Timestamp) -> Result<(), StorageError> {
        ProjectRepo::mark_completed(&mut self.tx, project_id, at)
            .await
            .map_err(storage_err)
    }

    // --- roles ---

    async fn replace_roles(
        &mut self,
        project_id: DbId,
        roles: &[NewRole],
    ) -> Result<Vec<RoleRecord>, StorageError> {
        let rows = RoleRepo::replace(&mut self.tx, project_id, roles)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().map(RoleRecord::from).collect())
    }

    async fn list_roles(&mut self, project_id: DbId) -> Result<Vec<RoleRecord>, StorageError> {
        let rows = RoleRepo::list_for_project(&mut self.tx, project_id)
            .await
            .map_err(storage_err)?;
        Ok(rows.into_iter().map(RoleRecord::from).collect())
    }

    // --- applications ---

    async fn insert_application(
        &mut self,
        input: &NewApplication,
        at: Timestamp,
    ) -> Result<ApplicationRecord, StorageError> {
        let row = ApplicationRepo::create(&mut self.tx, input, at)
            .await
            .map_err(storage_err)?;
        ApplicationRecord::try_from(row).map_err(decode_err)
    }

    async fn find_application(
        &mut self,
        application_id: DbId,
    ) -> Result<Option<ApplicationRecord>, StorageError> {
        ApplicationRepo::find_by_id(&mut self.tx, application_id)
            .await
            .map_err(storage_err)?
            .map(|row| ApplicationRecord::try_from(row).map_err(decode_err))
            .transpose()
    }

    async fn find_application_by_user(
        &mut self,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ApplicationRecord>, StorageError> {
        ApplicationRepo::find_by_project_and_user(&mut self.tx, project_id, user_id)
            .await
            .map_err(storage_err)?
            .map(|row| ApplicationRecord::try_from(row).map_err(decode_err))
            .transpose()
    }

    async fn list_applications(
        &mut self,
        project_id: DbId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        let rows = ApplicationRepo::list_for_project(&mut self.tx, project_id, status)
            .await
            .map_err(storage_err)?;
        applications(rows)
    }

    async fn list_applications_by_user(
        &mut self,
        user_id: DbId,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        let rows = ApplicationRepo::list_for_user(&mut self.tx, user_id)
            .await
            .map_err(storage_err)?;
        applications(rows)
    }

    async fn set_application_status(
        &mut self,
        application_id: DbId,
        status: ApplicationStatus,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        ApplicationRepo::set_status(&mut self.tx, application_id, status, at)
            .await
            .map_err(storage_err)
    }

    async fn delete_application(&mut self, application_id: DbId) -> Result<(), StorageError> {
        ApplicationRepo::delete(&mut self.tx, application_id)
            .await
            .map(|_| ())
            .map_err(storage_err)
    }

    // --- audit log ---

    async fn append_log(&mut self, entry: &NewAuditEntry) -> Result<(), StorageError> {
        ProjectLogRepo::append(&mut self.tx, entry)
            .await
            .map(|_| ())
            .map_err(storage_err)
    }

    async fn has_log(&mut self, project_id: DbId, action: &str) -> Result<bool, StorageError> {
        ProjectLogRepo::exists(&mut self.tx, project_id, action)
            .await
            .map_err(storage_err)
    }

    async fn list_logs(&mut self, project_id: DbId) -> Result<Vec<AuditEntry>, StorageError> {
        let rows = ProjectLogRepo::list_for_project(&mut self.tx, project_id)
            .await
            .map_err(storage_err)?;
        rows.into_iter()
            .map(|row| AuditEntry::try_from(row).map_err(decode_err))
            .collect()
    }

    // --- transaction ---

    async fn commit(self) -> Result<(), StorageError> {
        self.tx.commit().await.map_err(storage_err)
    }
}
