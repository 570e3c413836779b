//! Storage seam consumed by the engine.
//!
//! A [`StorageGateway`] hands out [`StorageTx`] transactions. Everything an
//! operation reads or writes goes through one transaction, and nothing is
//! visible to other transactions until [`StorageTx::commit`] succeeds.
//! Dropping a transaction without committing discards its writes.
//!
//! [`StorageTx::lock_project`] must serialize concurrent transactions on the
//! same project: the second caller blocks until the first commits or rolls
//! back, and then observes its writes.

use async_trait::async_trait;
use teamhub_core::status::{ApplicationStatus, ProjectStatus};
use teamhub_core::types::{DbId, Timestamp};

use crate::error::StorageError;
use crate::records::{
    ApplicationRecord, AuditEntry, NewApplication, NewAuditEntry, NewProject, NewRole,
    ProjectChanges, ProjectRecord, ReputationRecord, RoleRecord,
};

#[async_trait]
pub trait StorageGateway: Send + Sync {
    type Tx: StorageTx;

    async fn begin(&self) -> Result<Self::Tx, StorageError>;
}

#[async_trait]
pub trait StorageTx: Send + Sized {
    // --- users & reputation ---

    async fn user_exists(&mut self, user_id: DbId) -> Result<bool, StorageError>;

    async fn reputation(&mut self, user_id: DbId)
        -> Result<Option<ReputationRecord>, StorageError>;

    /// Increment the user's completed-project counter, returning the new
    /// value, or `None` if the user does not exist.
    async fn increment_completed_count(&mut self, user_id: DbId)
        -> Result<Option<i32>, StorageError>;

    /// Add a badge; returns `false` if the user already held it.
    async fn add_badge(&mut self, user_id: DbId, badge: &str) -> Result<bool, StorageError>;

    // --- projects ---

    async fn insert_project(
        &mut self,
        owner_id: DbId,
        input: &NewProject,
        at: Timestamp,
    ) -> Result<ProjectRecord, StorageError>;

    /// Load a project and hold its lock until the transaction ends.
    async fn lock_project(&mut self, project_id: DbId)
        -> Result<Option<ProjectRecord>, StorageError>;

    async fn list_projects(
        &mut self,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<ProjectRecord>, StorageError>;

    /// Ids of `OPEN` projects whose deadline is before `now`.
    async fn list_expired_open(&mut self, now: Timestamp) -> Result<Vec<DbId>, StorageError>;

    async fn update_project(
        &mut self,
        project_id: DbId,
        changes: &ProjectChanges,
        at: Timestamp,
    ) -> Result<(), StorageError>;

    async fn set_project_status(
        &mut self,
        project_id: DbId,
        status: ProjectStatus,
        at: Timestamp,
    ) -> Result<(), StorageError>;

    async fn mark_completion_requested(
        &mut self,
        project_id: DbId,
        at: Timestamp,
    ) -> Result<(), StorageError>;

    /// Add `user_id` to the project's completion votes; returns `false` if
    /// the vote was already recorded.
    async fn add_completion_vote(
        &mut self,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, StorageError>;

    /// Set status `COMPLETED` and `completed_at`.
    async fn mark_completed(&mut self, project_id: DbId, at: Timestamp)
        -> Result<(), StorageError>;

    // --- roles ---

    /// Delete every role of the project and insert `roles` in order.
    async fn replace_roles(
        &mut self,
        project_id: DbId,
        roles: &[NewRole],
    ) -> Result<Vec<RoleRecord>, StorageError>;

    async fn list_roles(&mut self, project_id: DbId) -> Result<Vec<RoleRecord>, StorageError>;

    // --- applications ---

    async fn insert_application(
        &mut self,
        input: &NewApplication,
        at: Timestamp,
    ) -> Result<ApplicationRecord, StorageError>;

    async fn find_application(
        &mut self,
        application_id: DbId,
    ) -> Result<Option<ApplicationRecord>, StorageError>;

    async fn find_application_by_user(
        &mut self,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ApplicationRecord>, StorageError>;

    async fn list_applications(
        &mut self,
        project_id: DbId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRecord>, StorageError>;

    async fn list_applications_by_user(
        &mut self,
        user_id: DbId,
    ) -> Result<Vec<ApplicationRecord>, StorageError>;

    async fn set_application_status(
        &mut self,
        application_id: DbId,
        status: ApplicationStatus,
        at: Timestamp,
    ) -> Result<(), StorageError>;

    async fn delete_application(&mut self, application_id: DbId) -> Result<(), StorageError>;

    // --- audit log ---

    async fn append_log(&mut self, entry: &NewAuditEntry) -> Result<(), StorageError>;

    async fn has_log(&mut self, project_id: DbId, action: &str) -> Result<bool, StorageError>;

    async fn list_logs(&mut self, project_id: DbId) -> Result<Vec<AuditEntry>, StorageError>;

    // --- transaction ---

    async fn commit(self) -> Result<(), StorageError>;
}
