//! Reputation ledger: completion counters and badges.
//!
//! Only the engine writes here, always inside the transaction of the
//! operation that earned the reputation.

use serde::Serialize;
use teamhub_core::badges;
use teamhub_core::error::CoreError;
use teamhub_core::types::DbId;

use crate::engine::{require_user, ProjectEngine};
use crate::error::EngineResult;
use crate::gateway::{StorageGateway, StorageTx};
use crate::notify::Outbox;
use crate::records::ReputationRecord;

/// Result of one completion grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionGrant {
    pub user_id: DbId,
    pub completed_project_count: i32,
    /// Badge added by this grant (`None` if already held).
    pub new_badge: Option<&'static str>,
}

pub struct ReputationLedger;

impl ReputationLedger {
    /// Count one more completed project for `user_id` and award
    /// `COMPLETED_PRO` once the threshold is met.
    pub async fn grant_completion<T: StorageTx>(
        tx: &mut T,
        user_id: DbId,
    ) -> EngineResult<CompletionGrant> {
        let count = tx
            .increment_completed_count(user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: user_id,
            })?;

        let mut new_badge = None;
        if let Some(badge) = badges::badge_for_completion_count(count) {
            if tx.add_badge(user_id, badge).await? {
                new_badge = Some(badge);
            }
        }

        Ok(CompletionGrant {
            user_id,
            completed_project_count: count,
            new_badge,
        })
    }

    /// Add `badge` unless the user already holds it. Returns whether it was added.
    pub async fn grant_if_absent<T: StorageTx>(
        tx: &mut T,
        user_id: DbId,
        badge: &str,
    ) -> EngineResult<bool> {
        require_user(tx, user_id).await?;
        Ok(tx.add_badge(user_id, badge).await?)
    }

    pub async fn load<T: StorageTx>(tx: &mut T, user_id: DbId) -> EngineResult<ReputationRecord> {
        tx.reputation(user_id).await?.ok_or_else(|| {
            CoreError::NotFound {
                entity: "User",
                id: user_id,
            }
            .into()
        })
    }
}

impl<G: StorageGateway> ProjectEngine<G> {
    /// Completed-project count and badges of a user.
    pub async fn reputation(&self, user_id: DbId) -> EngineResult<ReputationRecord> {
        let mut tx = self.gateway.begin().await?;
        let record = ReputationLedger::load(&mut tx, user_id).await?;
        self.finish(tx, Outbox::default()).await?;
        Ok(record)
    }
}
