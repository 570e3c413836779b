//! In-memory storage gateway and recording sink.
//!
//! A transaction holds the store's mutex from `begin` until it is committed
//! or dropped, and works on a private copy of the state. Commit swaps the
//! copy in; dropping discards it. This serializes all transactions, which
//! is stronger than the per-project locking the gateway contract asks for.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use teamhub_core::status::{ApplicationStatus, ProjectStatus};
use teamhub_core::types::{DbId, Timestamp};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::StorageError;
use crate::gateway::{StorageGateway, StorageTx};
use crate::notify::{Notification, NotificationSink, NotifyError};
use crate::records::{
    ApplicationRecord, AuditEntry, NewApplication, NewAuditEntry, NewProject, NewRole,
    ProjectChanges, ProjectRecord, ReputationRecord, RoleRecord,
};

#[derive(Debug, Clone)]
struct UserRow {
    completed_project_count: i32,
    badges: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_id: DbId,
    users: BTreeMap<DbId, UserRow>,
    projects: BTreeMap<DbId, ProjectRecord>,
    roles: Vec<RoleRecord>,
    applications: BTreeMap<DbId, ApplicationRecord>,
    logs: Vec<AuditEntry>,
}

impl MemoryState {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn project_mut(&mut self, project_id: DbId) -> Result<&mut ProjectRecord, StorageError> {
        self.projects
            .get_mut(&project_id)
            .ok_or_else(|| missing_row("projects", project_id))
    }
}

fn missing_row(table: &str, id: DbId) -> StorageError {
    StorageError::backend(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("no row {id} in {table}"),
    ))
}

/// Transactional in-memory store.
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user and return its id.
    pub async fn add_user(&self) -> DbId {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.users.insert(
            id,
            UserRow {
                completed_project_count: 0,
                badges: BTreeSet::new(),
            },
        );
        id
    }
}

#[async_trait]
impl StorageGateway for InMemoryGateway {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StorageError> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx { guard, work })
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

#[async_trait]
impl StorageTx for MemoryTx {
    async fn user_exists(&mut self, user_id: DbId) -> Result<bool, StorageError> {
        Ok(self.work.users.contains_key(&user_id))
    }

    async fn reputation(
        &mut self,
        user_id: DbId,
    ) -> Result<Option<ReputationRecord>, StorageError> {
        Ok(self.work.users.get(&user_id).map(|u| ReputationRecord {
            user_id,
            completed_project_count: u.completed_project_count,
            badges: u.badges.clone(),
        }))
    }

    async fn increment_completed_count(
        &mut self,
        user_id: DbId,
    ) -> Result<Option<i32>, StorageError> {
        Ok(self.work.users.get_mut(&user_id).map(|u| {
            u.completed_project_count += 1;
            u.completed_project_count
        }))
    }

    async fn add_badge(&mut self, user_id: DbId, badge: &str) -> Result<bool, StorageError> {
        let user = self
            .work
            .users
            .get_mut(&user_id)
            .ok_or_else(|| missing_row("users", user_id))?;
        Ok(user.badges.insert(badge.to_string()))
    }

    async fn insert_project(
        &mut self,
        owner_id: DbId,
        input: &NewProject,
        at: Timestamp,
    ) -> Result<ProjectRecord, StorageError> {
        let id = self.work.next_id();
        let project = ProjectRecord {
            id,
            owner_id,
            title: input.title.clone(),
            description: input.description.clone(),
            kind: input.kind,
            status: input.status,
            deadline: input.deadline,
            completion_requested: false,
            completion_votes: BTreeSet::new(),
            completed_at: None,
            metadata: input.metadata.clone(),
            created_at: at,
            updated_at: at,
        };
        self.work.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn lock_project(
        &mut self,
        project_id: DbId,
    ) -> Result<Option<ProjectRecord>, StorageError> {
        Ok(self.work.projects.get(&project_id).cloned())
    }

    async fn list_projects(
        &mut self,
        status: Option<ProjectStatus>,
    ) -> Result<Vec<ProjectRecord>, StorageError> {
        Ok(self
            .work
            .projects
            .values()
            .rev()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect())
    }

    async fn list_expired_open(&mut self, now: Timestamp) -> Result<Vec<DbId>, StorageError> {
        Ok(self
            .work
            .projects
            .values()
            .filter(|p| p.status == ProjectStatus::Open && p.deadline.is_some_and(|d| d < now))
            .map(|p| p.id)
            .collect())
    }

    async fn update_project(
        &mut self,
        project_id: DbId,
        changes: &ProjectChanges,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        let p = self.work.project_mut(project_id)?;
        if let Some(ref title) = changes.title {
            p.title = title.clone();
        }
        if let Some(ref description) = changes.description {
            p.description = Some(description.clone());
        }
        if let Some(kind) = changes.kind {
            p.kind = kind;
        }
        if let Some(deadline) = changes.deadline {
            p.deadline = deadline;
        }
        if let Some(ref metadata) = changes.metadata {
            p.metadata = metadata.clone();
        }
        p.updated_at = at;
        Ok(())
    }

    async fn set_project_status(
        &mut self,
        project_id: DbId,
        status: ProjectStatus,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        let p = self.work.project_mut(project_id)?;
        p.status = status;
        p.updated_at = at;
        Ok(())
    }

    async fn mark_completion_requested(
        &mut self,
        project_id: DbId,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        let p = self.work.project_mut(project_id)?;
        p.completion_requested = true;
        p.updated_at = at;
        Ok(())
    }

    async fn add_completion_vote(
        &mut self,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, StorageError> {
        let p = self.work.project_mut(project_id)?;
        Ok(p.completion_votes.insert(user_id))
    }

    async fn mark_completed(&mut self, project_id: DbId, at: Timestamp) -> Result<(), StorageError> {
        let p = self.work.project_mut(project_id)?;
        p.status = ProjectStatus::Completed;
        p.completed_at = Some(at);
        p.updated_at = at;
        Ok(())
    }

    async fn replace_roles(
        &mut self,
        project_id: DbId,
        roles: &[NewRole],
    ) -> Result<Vec<RoleRecord>, StorageError> {
        self.work.roles.retain(|r| r.project_id != project_id);
        let mut inserted = Vec::with_capacity(roles.len());
        for role in roles {
            let record = RoleRecord {
                id: self.work.next_id(),
                project_id,
                name: role.name.clone(),
                count: role.count,
                skills: role.skills.clone(),
            };
            self.work.roles.push(record.clone());
            inserted.push(record);
        }
        Ok(inserted)
    }

    async fn list_roles(&mut self, project_id: DbId) -> Result<Vec<RoleRecord>, StorageError> {
        Ok(self
            .work
            .roles
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn insert_application(
        &mut self,
        input: &NewApplication,
        at: Timestamp,
    ) -> Result<ApplicationRecord, StorageError> {
        let duplicate = self
            .work
            .applications
            .values()
            .any(|a| a.project_id == input.project_id && a.user_id == input.user_id);
        if duplicate {
            return Err(StorageError::UniqueViolation(
                "uq_applications_project_user".to_string(),
            ));
        }

        let id = self.work.next_id();
        let app = ApplicationRecord {
            id,
            project_id: input.project_id,
            user_id: input.user_id,
            role_name: input.role_name.clone(),
            status: ApplicationStatus::Pending,
            answers: input.answers.clone(),
            created_at: at,
            updated_at: at,
        };
        self.work.applications.insert(id, app.clone());
        Ok(app)
    }

    async fn find_application(
        &mut self,
        application_id: DbId,
    ) -> Result<Option<ApplicationRecord>, StorageError> {
        Ok(self.work.applications.get(&application_id).cloned())
    }

    async fn find_application_by_user(
        &mut self,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ApplicationRecord>, StorageError> {
        Ok(self
            .work
            .applications
            .values()
            .find(|a| a.project_id == project_id && a.user_id == user_id)
            .cloned())
    }

    async fn list_applications(
        &mut self,
        project_id: DbId,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        Ok(self
            .work
            .applications
            .values()
            .filter(|a| a.project_id == project_id)
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect())
    }

    async fn list_applications_by_user(
        &mut self,
        user_id: DbId,
    ) -> Result<Vec<ApplicationRecord>, StorageError> {
        Ok(self
            .work
            .applications
            .values()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn set_application_status(
        &mut self,
        application_id: DbId,
        status: ApplicationStatus,
        at: Timestamp,
    ) -> Result<(), StorageError> {
        let app = self
            .work
            .applications
            .get_mut(&application_id)
            .ok_or_else(|| missing_row("applications", application_id))?;
        app.status = status;
        app.updated_at = at;
        Ok(())
    }

    async fn delete_application(&mut self, application_id: DbId) -> Result<(), StorageError> {
        self.work.applications.remove(&application_id);
        Ok(())
    }

    async fn append_log(&mut self, entry: &NewAuditEntry) -> Result<(), StorageError> {
        let id = self.work.next_id();
        self.work.logs.push(AuditEntry {
            id,
            project_id: entry.project_id,
            actor_id: entry.actor_id,
            action: entry.action.to_string(),
            old_status: entry.old_status,
            new_status: entry.new_status,
            details: entry.details.clone(),
            created_at: entry.created_at,
        });
        Ok(())
    }

    async fn has_log(&mut self, project_id: DbId, action: &str) -> Result<bool, StorageError> {
        Ok(self
            .work
            .logs
            .iter()
            .any(|l| l.project_id == project_id && l.action == action))
    }

    async fn list_logs(&mut self, project_id: DbId) -> Result<Vec<AuditEntry>, StorageError> {
        Ok(self
            .work
            .logs
            .iter()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn commit(mut self) -> Result<(), StorageError> {
        *self.guard = self.work;
        Ok(())
    }
}

/// Sink that keeps every notification it is given.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, user_id: DbId) -> Vec<Notification> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().await.push(notification.clone());
        Ok(())
    }
}
