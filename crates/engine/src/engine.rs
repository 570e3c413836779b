//! The engine handle shared by every request.

use std::sync::Arc;

use chrono::Duration;
use teamhub_core::error::CoreError;
use teamhub_core::lifecycle::{self, DEFAULT_RETENTION_DAYS};
use teamhub_core::role_fill::fill_summary;
use teamhub_core::status::ApplicationStatus;
use teamhub_core::types::{DbId, Timestamp};

use crate::error::EngineResult;
use crate::gateway::{StorageGateway, StorageTx};
use crate::notify::{NotificationSink, Outbox};
use crate::records::{ApplicationRecord, ProjectRecord, ProjectView, RoleRecord};

/// Tunables for lifecycle evaluation.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a `CLOSED` project may stay untouched before it is flagged
    /// as eligible for purging.
    pub retention: Duration,
}

impl EngineConfig {
    pub fn with_retention_days(days: i64) -> Self {
        Self {
            retention: Duration::days(days),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_retention_days(DEFAULT_RETENTION_DAYS)
    }
}

/// Project lifecycle, application review and completion consensus over a
/// [`StorageGateway`].
///
/// Every public operation runs in its own transaction and delivers its
/// notifications only after that transaction commits.
pub struct ProjectEngine<G> {
    pub(crate) gateway: G,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) config: EngineConfig,
}

impl<G: StorageGateway> ProjectEngine<G> {
    pub fn new(gateway: G, sink: Arc<dyn NotificationSink>, config: EngineConfig) -> Self {
        Self {
            gateway,
            sink,
            config,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Commit `tx`, then deliver whatever the operation queued.
    pub(crate) async fn finish(&self, tx: G::Tx, outbox: Outbox) -> EngineResult<()> {
        tx.commit().await?;
        if !outbox.is_empty() {
            tracing::debug!(count = outbox.len(), "Delivering notifications");
            outbox.deliver(self.sink.as_ref()).await;
        }
        Ok(())
    }

    pub(crate) fn view(
        &self,
        project: ProjectRecord,
        roles: Vec<RoleRecord>,
        accepted: &[ApplicationRecord],
        now: Timestamp,
    ) -> ProjectView {
        let purge_eligible = lifecycle::is_purge_eligible(
            project.status,
            project.updated_at,
            now,
            self.config.retention,
        );
        ProjectView {
            role_fill: fill_summary(&roles, accepted),
            accepted_members: accepted.len(),
            purge_eligible,
            roles,
            project,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared transaction helpers
// ---------------------------------------------------------------------------

/// Lock a project or fail with `NotFound`.
pub(crate) async fn require_project<T: StorageTx>(
    tx: &mut T,
    project_id: DbId,
) -> EngineResult<ProjectRecord> {
    tx.lock_project(project_id).await?.ok_or_else(|| {
        CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }
        .into()
    })
}

pub(crate) async fn require_user<T: StorageTx>(tx: &mut T, user_id: DbId) -> EngineResult<()> {
    if tx.user_exists(user_id).await? {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }
        .into())
    }
}

pub(crate) fn require_owner(project: &ProjectRecord, actor_id: DbId, action: &str) -> Result<(), CoreError> {
    if project.is_owned_by(actor_id) {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(format!(
            "Only the project owner can {action}"
        )))
    }
}

/// Applications currently in `ACCEPTED` status.
pub(crate) async fn accepted_members<T: StorageTx>(
    tx: &mut T,
    project_id: DbId,
) -> EngineResult<Vec<ApplicationRecord>> {
    Ok(tx
        .list_applications(project_id, Some(ApplicationStatus::Accepted))
        .await?)
}
