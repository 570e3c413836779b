//! Applying, withdrawing and owner review, including auto-close on full
//! staffing.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use teamhub_core::audit::{ACTION_STATUS_CHANGE, TRIGGER_ROLE_FILL};
use teamhub_core::badges::BADGE_TEAM_MEMBER;
use teamhub_core::error::CoreError;
use teamhub_core::status::{ApplicationStatus, ProjectStatus};
use teamhub_engine::memory::RecordingSink;
use teamhub_engine::{EngineError, Notification, NotificationSink, NotifyError};

use common::{answers, harness, harness_with_sink, new_project, role};

struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Err("inbox unavailable".into())
    }
}

// ---------------------------------------------------------------------------
// Applying and withdrawing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn apply_notifies_owner_and_applicant() {
    let h = harness();
    let owner = h.user("owner").await;
    let applicant = h.user("applicant").await;
    let project = h.open_project(owner, vec![role("Dev", 2)]).await;

    let app = h
        .engine
        .apply(project, applicant, "Dev".to_string(), answers())
        .await
        .unwrap();
    assert_eq!(app.status, ApplicationStatus::Pending);
    assert_eq!(app.role_name, "Dev");

    assert!(h
        .sink
        .sent_to(owner)
        .await
        .iter()
        .any(|n| n.message.contains("New application")));
    assert_eq!(h.sink.sent_to(applicant).await.len(), 1);
    assert!(h.sink.sent().await.iter().all(|n| n.project_id == Some(project)));
}

#[tokio::test]
async fn duplicate_application_conflicts_until_withdrawn() {
    let h = harness();
    let owner = h.user("owner").await;
    let applicant = h.user("applicant").await;
    let project = h.open_project(owner, vec![role("Dev", 2)]).await;

    h.apply(project, applicant, "Dev").await;
    let again = h
        .engine
        .apply(project, applicant, "Dev".to_string(), answers())
        .await;
    assert_matches!(again, Err(EngineError::Core(CoreError::Conflict(_))));

    h.engine.withdraw_application(project, applicant).await.unwrap();
    let reapplied = h
        .engine
        .apply(project, applicant, "Dev".to_string(), answers())
        .await;
    assert!(reapplied.is_ok());
}

#[tokio::test]
async fn apply_requires_open_project() {
    let h = harness();
    let owner = h.user("owner").await;
    let applicant = h.user("applicant").await;
    let draft = h
        .engine
        .create_project(owner, new_project("Draft", ProjectStatus::Draft, vec![role("Dev", 1)]))
        .await
        .unwrap()
        .project
        .id;

    let result = h
        .engine
        .apply(draft, applicant, "Dev".to_string(), answers())
        .await;
    assert_matches!(result, Err(EngineError::Core(CoreError::Conflict(_))));

    let missing = h
        .engine
        .apply(404, applicant, "Dev".to_string(), answers())
        .await;
    assert_matches!(missing, Err(EngineError::Core(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn accepted_application_cannot_be_withdrawn() {
    let h = harness();
    let owner = h.user("owner").await;
    let project = h.open_project(owner, vec![role("Dev", 3)]).await;
    let member = h.member(project, owner, "member", "Dev").await;

    let result = h.engine.withdraw_application(project, member).await;
    assert_matches!(result, Err(EngineError::Core(CoreError::InvalidTransition(_))));

    let stranger = h.user("stranger").await;
    let result = h.engine.withdraw_application(project, stranger).await;
    assert_matches!(result, Err(EngineError::Core(CoreError::NotFound { .. })));
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

#[tokio::test]
async fn only_owner_reviews_applications() {
    let h = harness();
    let owner = h.user("owner").await;
    let applicant = h.user("applicant").await;
    let project = h.open_project(owner, vec![role("Dev", 2)]).await;
    let app = h.apply(project, applicant, "Dev").await;

    let result = h
        .engine
        .set_application_status(app, ApplicationStatus::Accepted, applicant)
        .await;
    assert_matches!(result, Err(EngineError::Core(CoreError::Unauthorized(_))));

    let listed = h.engine.list_applications(project, applicant, None).await;
    assert_matches!(listed, Err(EngineError::Core(CoreError::Unauthorized(_))));

    let pending = h
        .engine
        .list_applications(project, owner, Some(ApplicationStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
}

#[tokio::test]
async fn pending_is_not_a_valid_decision() {
    let h = harness();
    let owner = h.user("owner").await;
    let applicant = h.user("applicant").await;
    let project = h.open_project(owner, vec![role("Dev", 2)]).await;
    let app = h.apply(project, applicant, "Dev").await;

    let result = h
        .engine
        .set_application_status(app, ApplicationStatus::Pending, owner)
        .await;
    assert_matches!(result, Err(EngineError::Core(CoreError::Validation(_))));
}

#[tokio::test]
async fn accepting_grants_team_member_badge_once() {
    let h = harness();
    let owner = h.user("owner").await;
    let first = h.open_project(owner, vec![role("Dev", 3)]).await;
    let second = h.open_project(owner, vec![role("Dev", 3)]).await;
    let member = h.member(first, owner, "member", "Dev").await;

    let app = h.apply(second, member, "Dev").await;
    h.engine
        .set_application_status(app, ApplicationStatus::Accepted, owner)
        .await
        .unwrap();

    let rep = h.engine.reputation(member).await.unwrap();
    assert!(rep.badges.contains(BADGE_TEAM_MEMBER));
    let badge_notices = h
        .sink
        .sent_to(member)
        .await
        .into_iter()
        .filter(|n| n.message.contains(BADGE_TEAM_MEMBER))
        .count();
    assert_eq!(badge_notices, 1);
}

#[tokio::test]
async fn rejected_applicant_can_be_reconsidered() {
    let h = harness();
    let owner = h.user("owner").await;
    let applicant = h.user("applicant").await;
    let project = h.open_project(owner, vec![role("Dev", 2)]).await;
    let app = h.apply(project, applicant, "Dev").await;

    let rejected = h
        .engine
        .set_application_status(app, ApplicationStatus::Rejected, owner)
        .await
        .unwrap();
    assert_eq!(rejected.application.status, ApplicationStatus::Rejected);

    let again = h
        .engine
        .set_application_status(app, ApplicationStatus::Rejected, owner)
        .await;
    assert_matches!(again, Err(EngineError::Core(CoreError::InvalidTransition(_))));

    let accepted = h
        .engine
        .set_application_status(app, ApplicationStatus::Accepted, owner)
        .await
        .unwrap();
    assert_eq!(accepted.application.status, ApplicationStatus::Accepted);
}

// ---------------------------------------------------------------------------
// Auto-close on full staffing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn filling_every_role_closes_the_project() {
    let h = harness();
    let owner = h.user("owner").await;
    let project = h.open_project(owner, vec![role("Dev", 2)]).await;

    let a = h.user("a").await;
    let b = h.user("b").await;
    let app_a = h.apply(project, a, "Dev").await;
    let app_b = h.apply(project, b, "Dev").await;

    let first = h
        .engine
        .set_application_status(app_a, ApplicationStatus::Accepted, owner)
        .await
        .unwrap();
    assert!(!first.auto_closed);
    assert_eq!(first.project_status, ProjectStatus::Open);

    let second = h
        .engine
        .set_application_status(app_b, ApplicationStatus::Accepted, owner)
        .await
        .unwrap();
    assert!(second.auto_closed);
    assert_eq!(second.project_status, ProjectStatus::Closed);

    let history = h.engine.project_history(project, owner).await.unwrap();
    let close = history
        .iter()
        .find(|e| e.action == ACTION_STATUS_CHANGE)
        .expect("auto-close should be logged");
    assert_eq!(close.actor_id, None);
    assert_eq!(close.details["trigger"], TRIGGER_ROLE_FILL);
    assert_eq!(close.new_status, Some(ProjectStatus::Closed));

    assert!(h
        .sink
        .sent_to(owner)
        .await
        .iter()
        .any(|n| n.message.contains("Every role")));
}

#[tokio::test]
async fn owner_cannot_accept_after_auto_close() {
    let h = harness();
    let owner = h.user("owner").await;
    let project = h.open_project(owner, vec![role("Dev", 1)]).await;

    let a = h.user("a").await;
    let late = h.user("late").await;
    let app_a = h.apply(project, a, "Dev").await;
    let app_late = h.apply(project, late, "Dev").await;

    h.engine
        .set_application_status(app_a, ApplicationStatus::Accepted, owner)
        .await
        .unwrap();

    let result = h
        .engine
        .set_application_status(app_late, ApplicationStatus::Accepted, owner)
        .await;
    assert_matches!(result, Err(EngineError::Core(CoreError::InvalidTransition(_))));

    let rejected = h
        .engine
        .set_application_status(app_late, ApplicationStatus::Rejected, owner)
        .await
        .unwrap();
    assert_eq!(rejected.project_status, ProjectStatus::Closed);
}

#[tokio::test]
async fn role_is_never_overfilled() {
    let h = harness();
    let owner = h.user("owner").await;
    let project = h
        .open_project(owner, vec![role("Dev", 1), role("Design", 1)])
        .await;

    let a = h.user("a").await;
    let b = h.user("b").await;
    let app_a = h.apply(project, a, "Dev").await;
    let app_b = h.apply(project, b, "Dev").await;

    h.engine
        .set_application_status(app_a, ApplicationStatus::Accepted, owner)
        .await
        .unwrap();
    let result = h
        .engine
        .set_application_status(app_b, ApplicationStatus::Accepted, owner)
        .await;
    assert_matches!(result, Err(EngineError::Core(CoreError::Conflict(_))));

    let detail = h.engine.project_detail(project).await.unwrap();
    assert_eq!(detail.project.status, ProjectStatus::Open);
    assert_eq!(detail.accepted_members, 1);
}

#[tokio::test]
async fn concurrent_accepts_close_the_project_once() {
    let h = harness();
    let owner = h.user("owner").await;
    let project = h.open_project(owner, vec![role("Dev", 1)]).await;

    let a = h.user("a").await;
    let b = h.user("b").await;
    let app_a = h.apply(project, a, "Dev").await;
    let app_b = h.apply(project, b, "Dev").await;

    let (ra, rb) = tokio::join!(
        h.engine
            .set_application_status(app_a, ApplicationStatus::Accepted, owner),
        h.engine
            .set_application_status(app_b, ApplicationStatus::Accepted, owner),
    );
    assert_eq!(ra.is_ok() as u8 + rb.is_ok() as u8, 1);

    let closes = h
        .engine
        .project_history(project, owner)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.action == ACTION_STATUS_CHANGE)
        .count();
    assert_eq!(closes, 1);
}

#[tokio::test]
async fn project_without_roles_never_auto_closes() {
    let h = harness();
    let owner = h.user("owner").await;
    let project = h.open_project(owner, vec![]).await;

    let decision = {
        let member = h.user("member").await;
        let app = h.apply(project, member, "Anything").await;
        h.engine
            .set_application_status(app, ApplicationStatus::Accepted, owner)
            .await
            .unwrap()
    };
    assert!(!decision.auto_closed);
    assert_eq!(decision.project_status, ProjectStatus::Open);
}

// ---------------------------------------------------------------------------
// Notification failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failing_sink_does_not_fail_operations() {
    let h = harness_with_sink(Arc::new(FailingSink), Arc::new(RecordingSink::new()));
    let owner = h.user("owner").await;
    let applicant = h.user("applicant").await;
    let project = h.open_project(owner, vec![role("Dev", 1)]).await;

    let app = h.apply(project, applicant, "Dev").await;
    let decision = h
        .engine
        .set_application_status(app, ApplicationStatus::Accepted, owner)
        .await
        .unwrap();
    assert!(decision.auto_closed);
}
