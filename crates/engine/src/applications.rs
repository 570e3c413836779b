//! Applying to projects and reviewing applications.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use teamhub_core::application;
use teamhub_core::audit::{ACTION_STATUS_CHANGE, TRIGGER_ROLE_FILL};
use teamhub_core::badges::BADGE_TEAM_MEMBER;
use teamhub_core::error::CoreError;
use teamhub_core::lifecycle;
use teamhub_core::notification::{applications_link, project_link, Severity};
use teamhub_core::role_fill;
use teamhub_core::status::{ApplicationStatus, ProjectStatus};
use teamhub_core::types::{DbId, Timestamp};
use teamhub_core::validation;

use crate::engine::{accepted_members, require_owner, require_project, require_user, ProjectEngine};
use crate::error::{EngineResult, StorageError};
use crate::gateway::{StorageGateway, StorageTx};
use crate::notify::{Notification, Outbox};
use crate::records::{ApplicationRecord, NewApplication, NewAuditEntry, ProjectRecord};
use crate::reputation::ReputationLedger;

/// Outcome of an owner decision on an application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDecision {
    pub application: ApplicationRecord,
    /// Project status after the decision (and any auto-close it caused).
    pub project_status: ProjectStatus,
    /// Whether this decision filled the last open slot and closed the project.
    pub auto_closed: bool,
}

impl<G: StorageGateway> ProjectEngine<G> {
    /// Apply to an `OPEN` project for `role_name`.
    pub async fn apply(
        &self,
        project_id: DbId,
        user_id: DbId,
        role_name: String,
        answers: BTreeMap<String, String>,
    ) -> EngineResult<ApplicationRecord> {
        validation::validate_answers(&answers)?;
        if role_name.trim().is_empty() {
            return Err(CoreError::Validation("Role name must not be empty".to_string()).into());
        }

        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;
        let project = require_project(&mut tx, project_id).await?;
        require_user(&mut tx, user_id).await?;

        if !lifecycle::accepts_applications(project.status) {
            return Err(CoreError::Conflict(format!(
                "Project is {} and not accepting applications",
                project.status
            ))
            .into());
        }
        if tx.find_application_by_user(project_id, user_id).await?.is_some() {
            return Err(already_applied().into());
        }

        let input = NewApplication {
            project_id,
            user_id,
            role_name,
            answers,
        };
        let created = match tx.insert_application(&input, now).await {
            Ok(app) => app,
            Err(StorageError::UniqueViolation(_)) => return Err(already_applied().into()),
            Err(e) => return Err(e.into()),
        };

        let mut outbox = Outbox::default();
        outbox.push(
            Notification::new(
                project.owner_id,
                Severity::Info,
                format!("New application for '{}' ({})", project.title, created.role_name),
            )
            .with_link(applications_link(project_id))
            .for_project(project_id),
        );
        outbox.push(
            Notification::new(
                user_id,
                Severity::Success,
                format!("Your application to '{}' was submitted", project.title),
            )
            .with_link(project_link(project_id))
            .for_project(project_id),
        );

        self.finish(tx, outbox).await?;

        tracing::info!(
            application_id = created.id,
            project_id,
            user_id,
            role = %created.role_name,
            "Application submitted"
        );
        Ok(created)
    }

    /// Withdraw the caller's own pending application.
    pub async fn withdraw_application(&self, project_id: DbId, user_id: DbId) -> EngineResult<()> {
        let mut tx = self.gateway.begin().await?;
        require_project(&mut tx, project_id).await?;

        let app = tx
            .find_application_by_user(project_id, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Application for project",
                id: project_id,
            })?;
        application::validate_withdrawal(app.status)?;

        tx.delete_application(app.id).await?;
        self.finish(tx, Outbox::default()).await?;

        tracing::info!(application_id = app.id, project_id, user_id, "Application withdrawn");
        Ok(())
    }

    /// Owner decision on an application.
    ///
    /// Accepting re-runs the role-fill check in the same transaction and
    /// closes an `OPEN` project once every role is staffed.
    pub async fn set_application_status(
        &self,
        application_id: DbId,
        target: ApplicationStatus,
        actor_id: DbId,
    ) -> EngineResult<ApplicationDecision> {
        application::validate_decision(target)?;

        let now = Utc::now();
        let mut tx = self.gateway.begin().await?;

        let app = find_application(&mut tx, application_id).await?;
        let project = require_project(&mut tx, app.project_id).await?;
        // Re-read under the project lock.
        let app = find_application(&mut tx, application_id).await?;

        require_owner(&project, actor_id, "review applications")?;
        if project.status == ProjectStatus::Completed {
            return Err(CoreError::AlreadyCompleted { id: project.id }.into());
        }
        application::validate_transition(app.status, target)?;

        let mut outbox = Outbox::default();
        let mut project_status = project.status;
        let mut auto_closed = false;

        if target == ApplicationStatus::Accepted {
            if !lifecycle::accepts_members(project.status) {
                return Err(CoreError::InvalidTransition(format!(
                    "Cannot accept applicants while project is {}",
                    project.status
                ))
                .into());
            }

            let roles = tx.list_roles(project.id).await?;
            let accepted = accepted_members(&mut tx, project.id).await?;
            if let Some(role) = roles.iter().find(|r| r.name == app.role_name) {
                if !role_fill::has_capacity(role, &accepted) {
                    return Err(CoreError::Conflict(format!(
                        "Role '{}' is already fully staffed",
                        role.name
                    ))
                    .into());
                }
            }

            tx.set_application_status(app.id, target, now).await?;

            if ReputationLedger::grant_if_absent(&mut tx, app.user_id, BADGE_TEAM_MEMBER).await? {
                outbox.push(
                    Notification::new(
                        app.user_id,
                        Severity::Success,
                        "You joined your first team and earned the TEAM_MEMBER badge",
                    )
                    .for_project(project.id),
                );
            }
            outbox.push(
                Notification::new(
                    app.user_id,
                    Severity::Success,
                    format!("You were accepted to '{}' as {}", project.title, app.role_name),
                )
                .with_link(project_link(project.id))
                .for_project(project.id),
            );

            let accepted = accepted_members(&mut tx, project.id).await?;
            if lifecycle::can_auto_close(project.status)
                && role_fill::is_fully_staffed(&roles, &accepted)
            {
                auto_close(&mut tx, &project, now, &mut outbox).await?;
                project_status = ProjectStatus::Closed;
                auto_closed = true;
            }
        } else {
            tx.set_application_status(app.id, target, now).await?;
            outbox.push(
                Notification::new(
                    app.user_id,
                    Severity::Info,
                    format!("Your application to '{}' was not accepted", project.title),
                )
                .with_link(project_link(project.id))
                .for_project(project.id),
            );
        }

        let application = find_application(&mut tx, application_id).await?;
        self.finish(tx, outbox).await?;

        tracing::info!(
            application_id,
            project_id = project.id,
            actor_id,
            status = %target,
            auto_closed,
            "Application reviewed"
        );
        Ok(ApplicationDecision {
            application,
            project_status,
            auto_closed,
        })
    }

    /// Every application of a project, optionally filtered. Owner only.
    pub async fn list_applications(
        &self,
        project_id: DbId,
        actor_id: DbId,
        status: Option<ApplicationStatus>,
    ) -> EngineResult<Vec<ApplicationRecord>> {
        let mut tx = self.gateway.begin().await?;
        let project = require_project(&mut tx, project_id).await?;
        require_owner(&project, actor_id, "view its applications")?;
        let apps = tx.list_applications(project_id, status).await?;
        self.finish(tx, Outbox::default()).await?;
        Ok(apps)
    }

    /// Applications submitted by `user_id`, newest first.
    pub async fn my_applications(&self, user_id: DbId) -> EngineResult<Vec<ApplicationRecord>> {
        let mut tx = self.gateway.begin().await?;
        let apps = tx.list_applications_by_user(user_id).await?;
        self.finish(tx, Outbox::default()).await?;
        Ok(apps)
    }
}

fn already_applied() -> CoreError {
    CoreError::Conflict("You have already applied to this project".to_string())
}

async fn find_application<T: StorageTx>(
    tx: &mut T,
    application_id: DbId,
) -> EngineResult<ApplicationRecord> {
    tx.find_application(application_id).await?.ok_or_else(|| {
        CoreError::NotFound {
            entity: "Application",
            id: application_id,
        }
        .into()
    })
}

/// System-initiated OPEN -> CLOSED once every role is staffed.
async fn auto_close<T: StorageTx>(
    tx: &mut T,
    project: &ProjectRecord,
    now: Timestamp,
    outbox: &mut Outbox,
) -> EngineResult<()> {
    tx.set_project_status(project.id, ProjectStatus::Closed, now).await?;
    tx.append_log(
        &NewAuditEntry::new(project.id, ACTION_STATUS_CHANGE, now)
            .status_change(project.status, ProjectStatus::Closed)
            .with_details(json!({ "trigger": TRIGGER_ROLE_FILL })),
    )
    .await?;
    outbox.push(
        Notification::new(
            project.owner_id,
            Severity::Success,
            format!("Every role on '{}' is filled; the project is now closed", project.title),
        )
        .with_link(project_link(project.id))
        .for_project(project.id),
    );

    tracing::info!(project_id = project.id, "Project closed after all roles were filled");
    Ok(())
}
