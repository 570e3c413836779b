//! Completion consensus.
//!
//! An owner with no accepted members completes a project directly. With a
//! team, the owner requests completion and the project completes once a
//! strict majority of the owner plus accepted members has confirmed.
//! Reaching `COMPLETED` is terminal; a confirmation that arrives afterwards
//! sees the final state and changes nothing.

use std::collections::BTreeSet;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use teamhub_core::audit::{
    ACTION_COMPLETION, ACTION_COMPLETION_REQUEST, METHOD_CONSENSUS, METHOD_DIRECT,
};
use teamhub_core::consensus::{self, Tally};
use teamhub_core::error::CoreError;
use teamhub_core::notification::{project_link, Severity};
use teamhub_core::status::ProjectStatus;
use teamhub_core::types::{DbId, Timestamp};

use crate::engine::{accepted_members, require_owner, require_project, ProjectEngine};
use crate::error::EngineResult;
use crate::gateway::{StorageGateway, StorageTx};
use crate::notify::{Notification, Outbox};
use crate::records::{NewAuditEntry, ProjectRecord};
use crate::reputation::ReputationLedger;

/// Result of a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionOutcome {
    /// No accepted members: the project completed immediately.
    Completed {
        completed_at: Timestamp,
        method: &'static str,
    },
    /// Members were asked to confirm.
    Requested { notified: usize },
}

/// Result of a completion confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmOutcome {
    pub status: ProjectStatus,
    pub current: usize,
    pub required: usize,
    pub total: usize,
    /// `false` when the caller had already voted or the project was
    /// already completed.
    pub vote_recorded: bool,
    pub completed_at: Option<Timestamp>,
}

/// Read-only view of a project's completion progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionStatus {
    pub project_id: DbId,
    pub status: ProjectStatus,
    pub requested: bool,
    pub current: usize,
    pub required: usize,
    pub total: usize,
    pub voters: BTreeSet<DbId>,
    /// Votes cast by current voters.
    pub voted: BTreeSet<DbId>,
    pub completed_at: Option<Timestamp>,
}

impl<G: StorageGateway> ProjectEngine<G> {
    pub async fn request_completion(
        &self,
        project_id: DbId,
        actor_id: DbId,
    ) -> EngineResult<CompletionOutcome> {
        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;
        let project = require_project(&mut tx, project_id).await?;
        require_owner(&project, actor_id, "request completion")?;
        if project.status == ProjectStatus::Completed {
            return Err(CoreError::AlreadyCompleted { id: project_id }.into());
        }

        let members = accepted_members(&mut tx, project_id).await?;
        let mut outbox = Outbox::default();

        if members.is_empty() {
            complete(&mut tx, &project, now, METHOD_DIRECT, None).await?;
            let grant = ReputationLedger::grant_completion(&mut tx, project.owner_id).await?;
            outbox.push(
                Notification::new(
                    project.owner_id,
                    Severity::Success,
                    format!("'{}' is complete", project.title),
                )
                .with_link(project_link(project_id))
                .for_project(project_id),
            );
            self.finish(tx, outbox).await?;

            tracing::info!(
                project_id,
                owner_id = project.owner_id,
                completed_count = grant.completed_project_count,
                "Project completed directly"
            );
            return Ok(CompletionOutcome::Completed {
                completed_at: now,
                method: METHOD_DIRECT,
            });
        }

        tx.mark_completion_requested(project_id, now).await?;
        if !tx.has_log(project_id, ACTION_COMPLETION_REQUEST).await? {
            tx.append_log(
                &NewAuditEntry::new(project_id, ACTION_COMPLETION_REQUEST, now)
                    .by(actor_id)
                    .with_details(json!({ "members": members.len() })),
            )
            .await?;
        }

        for member in &members {
            outbox.push(
                Notification::new(
                    member.user_id,
                    Severity::Info,
                    format!("The owner of '{}' asked the team to confirm completion", project.title),
                )
                .with_link(project_link(project_id))
                .for_project(project_id),
            );
        }
        let notified = outbox.len();
        self.finish(tx, outbox).await?;

        tracing::info!(project_id, notified, "Completion requested");
        Ok(CompletionOutcome::Requested { notified })
    }

    /// Record the caller's vote and complete the project once the stored votes
    /// reach a majority of the current team.
    pub async fn confirm_completion(
        &self,
        project_id: DbId,
        actor_id: DbId,
    ) -> EngineResult<ConfirmOutcome> {
        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;
        let project = require_project(&mut tx, project_id).await?;

        let members = accepted_members(&mut tx, project_id).await?;
        let universe = consensus::voter_universe(project.owner_id, members.iter().map(|m| m.user_id));

        if project.status == ProjectStatus::Completed {
            let tally = consensus::tally(&universe, &project.completion_votes);
            self.finish(tx, Outbox::default()).await?;
            return Ok(outcome(&project, tally, false));
        }

        if !universe.contains(&actor_id) {
            return Err(CoreError::Unauthorized(
                "Only the project owner or an accepted member can confirm completion".to_string(),
            )
            .into());
        }

        let vote_recorded = tx.add_completion_vote(project_id, actor_id).await?;
        let mut votes = project.completion_votes.clone();
        votes.insert(actor_id);
        let tally = consensus::tally(&universe, &votes);

        if !tally.is_reached() {
            self.finish(tx, Outbox::default()).await?;
            tracing::info!(
                project_id,
                user_id = actor_id,
                current = tally.current,
                required = tally.required,
                "Completion vote recorded"
            );
            return Ok(outcome(&project, tally, vote_recorded));
        }

        complete(&mut tx, &project, now, METHOD_CONSENSUS, Some(&tally)).await?;

        let mut outbox = Outbox::default();
        for &user_id in &universe {
            ReputationLedger::grant_completion(&mut tx, user_id).await?;
            outbox.push(
                Notification::new(
                    user_id,
                    Severity::Success,
                    format!("'{}' is complete. Well done!", project.title),
                )
                .with_link(project_link(project_id))
                .for_project(project_id),
            );
        }
        self.finish(tx, outbox).await?;

        tracing::info!(
            project_id,
            voters = tally.total,
            votes = tally.current,
            "Project completed by consensus"
        );
        Ok(ConfirmOutcome {
            status: ProjectStatus::Completed,
            current: tally.current,
            required: tally.required,
            total: tally.total,
            vote_recorded,
            completed_at: Some(now),
        })
    }

    pub async fn completion_status(&self, project_id: DbId) -> EngineResult<CompletionStatus> {
        let mut tx = self.gateway.begin().await?;
        let project = require_project(&mut tx, project_id).await?;
        let members = accepted_members(&mut tx, project_id).await?;
        self.finish(tx, Outbox::default()).await?;

        let voters = consensus::voter_universe(project.owner_id, members.iter().map(|m| m.user_id));
        let tally = consensus::tally(&voters, &project.completion_votes);
        let voted = project.completion_votes.clone();

        Ok(CompletionStatus {
            project_id,
            status: project.status,
            requested: project.completion_requested,
            current: tally.current,
            required: tally.required,
            total: tally.total,
            voters,
            voted,
            completed_at: project.completed_at,
        })
    }
}

async fn complete<T: StorageTx>(
    tx: &mut T,
    project: &ProjectRecord,
    now: Timestamp,
    method: &'static str,
    tally: Option<&Tally>,
) -> EngineResult<()> {
    tx.mark_completed(project.id, now).await?;

    let details = match tally {
        Some(t) => json!({ "method": method, "votes": t.current, "required": t.required, "total": t.total }),
        None => json!({ "method": method }),
    };
    let mut entry = NewAuditEntry::new(project.id, ACTION_COMPLETION, now)
        .status_change(project.status, ProjectStatus::Completed)
        .with_details(details);
    if method == METHOD_DIRECT {
        entry = entry.by(project.owner_id);
    }
    tx.append_log(&entry).await?;
    Ok(())
}

fn outcome(project: &ProjectRecord, tally: Tally, vote_recorded: bool) -> ConfirmOutcome {
    ConfirmOutcome {
        status: project.status,
        current: tally.current,
        required: tally.required,
        total: tally.total,
        vote_recorded,
        completed_at: project.completed_at,
    }
}
