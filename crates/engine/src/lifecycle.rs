//! Project creation, editing and status transitions.

use chrono::Utc;
use serde_json::json;
use teamhub_core::audit::{ACTION_CREATE, ACTION_STATUS_CHANGE, ACTION_UPDATE, TRIGGER_DEADLINE};
use teamhub_core::badges::BADGE_PROJECT_CREATOR;
use teamhub_core::error::CoreError;
use teamhub_core::lifecycle;
use teamhub_core::notification::{project_link, Severity};
use teamhub_core::status::ProjectStatus;
use teamhub_core::types::{DbId, Timestamp};
use teamhub_core::validation;

use crate::engine::{accepted_members, require_owner, require_project, require_user, ProjectEngine};
use crate::error::EngineResult;
use crate::gateway::{StorageGateway, StorageTx};
use crate::notify::{Notification, Outbox};
use crate::records::{
    AuditEntry, NewAuditEntry, NewProject, ProjectChanges, ProjectRecord, ProjectView,
};
use crate::reputation::ReputationLedger;

impl<G: StorageGateway> ProjectEngine<G> {
    /// Create a project owned by `owner_id`, in `DRAFT` or `OPEN`.
    ///
    /// The owner's first project earns the `PROJECT_CREATOR` badge.
    pub async fn create_project(&self, owner_id: DbId, input: NewProject) -> EngineResult<ProjectView> {
        validation::validate_title(&input.title)?;
        validation::validate_roles(&input.roles)?;
        validation::validate_metadata(&input.metadata)?;
        lifecycle::validate_initial_status(input.status)?;

        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;
        require_user(&mut tx, owner_id).await?;

        let project = tx.insert_project(owner_id, &input, now).await?;
        let roles = tx.replace_roles(project.id, &input.roles).await?;
        tx.append_log(
            &NewAuditEntry::new(project.id, ACTION_CREATE, now)
                .by(owner_id)
                .with_details(json!({ "status": project.status })),
        )
        .await?;

        let mut outbox = Outbox::default();
        if ReputationLedger::grant_if_absent(&mut tx, owner_id, BADGE_PROJECT_CREATOR).await? {
            outbox.push(
                Notification::new(
                    owner_id,
                    Severity::Success,
                    "You created your first project and earned the PROJECT_CREATOR badge",
                )
                .with_link(project_link(project.id))
                .for_project(project.id),
            );
        }

        let view = self.view(project, roles, &[], now);
        self.finish(tx, outbox).await?;

        tracing::info!(
            project_id = view.project.id,
            owner_id,
            status = %view.project.status,
            "Project created"
        );
        Ok(view)
    }

    /// Edit a project's descriptive fields. Roles, when given, replace the
    /// existing set wholesale.
    pub async fn update_project(
        &self,
        project_id: DbId,
        actor_id: DbId,
        changes: ProjectChanges,
    ) -> EngineResult<ProjectView> {
        if let Some(ref title) = changes.title {
            validation::validate_title(title)?;
        }
        if let Some(ref roles) = changes.roles {
            validation::validate_roles(roles)?;
        }
        if let Some(ref metadata) = changes.metadata {
            validation::validate_metadata(metadata)?;
        }

        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;
        let project = require_project(&mut tx, project_id).await?;
        require_owner(&project, actor_id, "edit it")?;
        if lifecycle::is_terminal(project.status) {
            return Err(CoreError::AlreadyCompleted { id: project_id }.into());
        }

        tx.update_project(project_id, &changes, now).await?;
        let roles = match changes.roles {
            Some(ref roles) => tx.replace_roles(project_id, roles).await?,
            None => tx.list_roles(project_id).await?,
        };
        tx.append_log(
            &NewAuditEntry::new(project_id, ACTION_UPDATE, now)
                .by(actor_id)
                .with_details(json!({ "roles_replaced": changes.roles.is_some() })),
        )
        .await?;

        let project = require_project(&mut tx, project_id).await?;
        let accepted = accepted_members(&mut tx, project_id).await?;
        let view = self.view(project, roles, &accepted, now);
        self.finish(tx, Outbox::default()).await?;

        tracing::info!(project_id, actor_id, "Project updated");
        Ok(view)
    }

    /// Owner-initiated status change, validated against the transition table.
    pub async fn set_project_status(
        &self,
        project_id: DbId,
        target: ProjectStatus,
        actor_id: DbId,
    ) -> EngineResult<ProjectRecord> {
        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;
        let project = require_project(&mut tx, project_id).await?;
        require_owner(&project, actor_id, "change its status")?;
        lifecycle::validate_transition(project.status, target)?;

        tx.set_project_status(project_id, target, now).await?;
        tx.append_log(
            &NewAuditEntry::new(project_id, ACTION_STATUS_CHANGE, now)
                .by(actor_id)
                .status_change(project.status, target),
        )
        .await?;

        let mut outbox = Outbox::default();
        for member in accepted_members(&mut tx, project_id).await? {
            outbox.push(
                Notification::new(
                    member.user_id,
                    Severity::Info,
                    format!("'{}' is now {target}", project.title),
                )
                .with_link(project_link(project_id))
                .for_project(project_id),
            );
        }

        let updated = require_project(&mut tx, project_id).await?;
        self.finish(tx, outbox).await?;

        tracing::info!(
            project_id,
            actor_id,
            from = %project.status,
            to = %target,
            "Project status changed"
        );
        Ok(updated)
    }

    /// List projects, closing any `OPEN` project whose deadline has passed.
    pub async fn list_projects(&self, status: Option<ProjectStatus>) -> EngineResult<Vec<ProjectRecord>> {
        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;
        let mut outbox = Outbox::default();

        for id in tx.list_expired_open(now).await? {
            if let Some(project) = tx.lock_project(id).await? {
                close_if_expired(&mut tx, project, now, &mut outbox).await?;
            }
        }

        let projects = tx.list_projects(status).await?;
        self.finish(tx, outbox).await?;
        Ok(projects)
    }

    /// A project with its roles, fill progress and purge eligibility.
    pub async fn project_detail(&self, project_id: DbId) -> EngineResult<ProjectView> {
        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;
        let mut outbox = Outbox::default();

        let project = require_project(&mut tx, project_id).await?;
        let project = close_if_expired(&mut tx, project, now, &mut outbox).await?;
        let roles = tx.list_roles(project_id).await?;
        let accepted = accepted_members(&mut tx, project_id).await?;

        let view = self.view(project, roles, &accepted, now);
        self.finish(tx, outbox).await?;
        Ok(view)
    }

    /// Audit history of a project, oldest first. Owner only.
    pub async fn project_history(&self, project_id: DbId, actor_id: DbId) -> EngineResult<Vec<AuditEntry>> {
        let mut tx = self.gateway.begin().await?;
        let project = require_project(&mut tx, project_id).await?;
        require_owner(&project, actor_id, "view its history")?;
        let entries = tx.list_logs(project_id).await?;
        self.finish(tx, Outbox::default()).await?;
        Ok(entries)
    }
}

/// Move a locked project to `CLOSED` if it is `OPEN` past its deadline.
/// Returns the project as it stands afterwards.
async fn close_if_expired<T: StorageTx>(
    tx: &mut T,
    project: ProjectRecord,
    now: Timestamp,
    outbox: &mut Outbox,
) -> EngineResult<ProjectRecord> {
    if !lifecycle::deadline_expired(project.status, project.deadline, now) {
        return Ok(project);
    }

    tx.set_project_status(project.id, ProjectStatus::Closed, now).await?;
    tx.append_log(
        &NewAuditEntry::new(project.id, ACTION_STATUS_CHANGE, now)
            .status_change(project.status, ProjectStatus::Closed)
            .with_details(json!({ "trigger": TRIGGER_DEADLINE })),
    )
    .await?;
    outbox.push(
        Notification::new(
            project.owner_id,
            Severity::Warning,
            format!("The deadline for '{}' passed and it was closed", project.title),
        )
        .with_link(project_link(project.id))
        .for_project(project.id),
    );

    tracing::info!(project_id = project.id, "Project closed after deadline");

    Ok(ProjectRecord {
        status: ProjectStatus::Closed,
        updated_at: now,
        ..project
    })
}
