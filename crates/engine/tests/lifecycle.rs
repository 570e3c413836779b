//! Project creation, manual transitions and lazy lifecycle evaluation.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use teamhub_core::audit::{ACTION_CREATE, ACTION_STATUS_CHANGE, ACTION_UPDATE, TRIGGER_DEADLINE};
use teamhub_core::badges::BADGE_PROJECT_CREATOR;
use teamhub_core::error::CoreError;
use teamhub_core::status::ProjectStatus;
use teamhub_engine::records::ProjectChanges;
use teamhub_engine::{EngineConfig, EngineError, NullSink, ProjectEngine};

use common::{harness, new_project, role};

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_project_grants_creator_badge_once() {
    let h = harness();
    let owner = h.user("owner").await;

    let view = h
        .engine
        .create_project(owner, new_project("First", ProjectStatus::Open, vec![role("Dev", 2)]))
        .await
        .unwrap();
    assert_eq!(view.project.status, ProjectStatus::Open);
    assert_eq!(view.roles.len(), 1);
    assert_eq!(view.role_fill[0].filled, 0);
    assert!(!view.purge_eligible);

    h.engine
        .create_project(owner, new_project("Second", ProjectStatus::Draft, vec![role("Dev", 1)]))
        .await
        .unwrap();

    let rep = h.engine.reputation(owner).await.unwrap();
    assert!(rep.badges.contains(BADGE_PROJECT_CREATOR));
    assert_eq!(rep.badges.len(), 1);

    let badge_notices = h
        .sink
        .sent_to(owner)
        .await
        .into_iter()
        .filter(|n| n.message.contains(BADGE_PROJECT_CREATOR))
        .count();
    assert_eq!(badge_notices, 1);

    let history = h.engine.project_history(view.project.id, owner).await.unwrap();
    assert_eq!(history[0].action, ACTION_CREATE);
}

#[tokio::test]
async fn create_project_rejects_bad_input() {
    let h = harness();
    let owner = h.user("owner").await;

    let duplicate_roles = h
        .engine
        .create_project(
            owner,
            new_project("Dupes", ProjectStatus::Open, vec![role("Dev", 1), role("Dev", 2)]),
        )
        .await;
    assert_matches!(duplicate_roles, Err(EngineError::Core(CoreError::Validation(_))));

    let blank = h
        .engine
        .create_project(owner, new_project("   ", ProjectStatus::Open, vec![role("Dev", 1)]))
        .await;
    assert_matches!(blank, Err(EngineError::Core(CoreError::Validation(_))));

    let closed = h
        .engine
        .create_project(owner, new_project("Closed", ProjectStatus::Closed, vec![role("Dev", 1)]))
        .await;
    assert_matches!(closed, Err(EngineError::Core(CoreError::Validation(_))));

    let ghost = h
        .engine
        .create_project(9_999, new_project("Ghost", ProjectStatus::Open, vec![role("Dev", 1)]))
        .await;
    assert_matches!(ghost, Err(EngineError::Core(CoreError::NotFound { entity: "User", .. })));
}

// ---------------------------------------------------------------------------
// Manual transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_transitions_follow_the_table() {
    let h = harness();
    let owner = h.user("owner").await;
    let id = h
        .engine
        .create_project(owner, new_project("Draft", ProjectStatus::Draft, vec![role("Dev", 1)]))
        .await
        .unwrap()
        .project
        .id;

    let skip = h.engine.set_project_status(id, ProjectStatus::Filled, owner).await;
    assert_matches!(skip, Err(EngineError::Core(CoreError::InvalidTransition(_))));

    let open = h.engine.set_project_status(id, ProjectStatus::Open, owner).await.unwrap();
    assert_eq!(open.status, ProjectStatus::Open);

    let filled = h.engine.set_project_status(id, ProjectStatus::Filled, owner).await.unwrap();
    assert_eq!(filled.status, ProjectStatus::Filled);

    let manual_complete = h.engine.set_project_status(id, ProjectStatus::Completed, owner).await;
    assert_matches!(manual_complete, Err(EngineError::Core(CoreError::InvalidTransition(_))));

    let history = h.engine.project_history(id, owner).await.unwrap();
    let changes: Vec<_> = history
        .iter()
        .filter(|e| e.action == ACTION_STATUS_CHANGE)
        .collect();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].old_status, Some(ProjectStatus::Open));
    assert_eq!(changes[1].new_status, Some(ProjectStatus::Filled));
    assert_eq!(changes[1].actor_id, Some(owner));
}

#[tokio::test]
async fn only_owner_changes_status() {
    let h = harness();
    let owner = h.user("owner").await;
    let other = h.user("other").await;
    let id = h.open_project(owner, vec![role("Dev", 1)]).await;

    let result = h.engine.set_project_status(id, ProjectStatus::Closed, other).await;
    assert_matches!(result, Err(EngineError::Core(CoreError::Unauthorized(_))));

    let result = h.engine.set_project_status(404, ProjectStatus::Closed, owner).await;
    assert_matches!(result, Err(EngineError::Core(CoreError::NotFound { entity: "Project", .. })));
}

#[tokio::test]
async fn completed_project_cannot_leave_completed() {
    let h = harness();
    let owner = h.user("owner").await;
    let id = h.open_project(owner, vec![role("Dev", 1)]).await;
    h.engine.request_completion(id, owner).await.unwrap();

    for target in [ProjectStatus::Open, ProjectStatus::Filled, ProjectStatus::Closed] {
        let result = h.engine.set_project_status(id, target, owner).await;
        assert_matches!(result, Err(EngineError::Core(CoreError::InvalidTransition(_))));
    }

    let edit = h
        .engine
        .update_project(id, owner, ProjectChanges { title: Some("New".into()), ..Default::default() })
        .await;
    assert_matches!(edit, Err(EngineError::Core(CoreError::AlreadyCompleted { .. })));
}

#[tokio::test]
async fn status_change_notifies_accepted_members() {
    let h = harness();
    let owner = h.user("owner").await;
    let id = h.open_project(owner, vec![role("Dev", 3)]).await;
    let member = h.member(id, owner, "member", "Dev").await;

    h.engine.set_project_status(id, ProjectStatus::Filled, owner).await.unwrap();

    let notices = h.sink.sent_to(member).await;
    assert!(notices.iter().any(|n| n.message.contains("FILLED")));
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_replaces_roles_wholesale() {
    let h = harness();
    let owner = h.user("owner").await;
    let id = h.open_project(owner, vec![role("Dev", 2), role("Design", 1)]).await;

    let view = h
        .engine
        .update_project(
            id,
            owner,
            ProjectChanges {
                title: Some("Renamed".to_string()),
                roles: Some(vec![role("Backend", 1)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(view.project.title, "Renamed");
    assert_eq!(view.roles.len(), 1);
    assert_eq!(view.roles[0].name, "Backend");

    let history = h.engine.project_history(id, owner).await.unwrap();
    assert_eq!(history.last().map(|e| e.action.as_str()), Some(ACTION_UPDATE));
}

#[tokio::test]
async fn update_and_history_are_owner_only() {
    let h = harness();
    let owner = h.user("owner").await;
    let other = h.user("other").await;
    let id = h.open_project(owner, vec![role("Dev", 1)]).await;

    let edit = h.engine.update_project(id, other, ProjectChanges::default()).await;
    assert_matches!(edit, Err(EngineError::Core(CoreError::Unauthorized(_))));

    let history = h.engine.project_history(id, other).await;
    assert_matches!(history, Err(EngineError::Core(CoreError::Unauthorized(_))));
}

// ---------------------------------------------------------------------------
// Lazy lifecycle evaluation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listing_closes_open_projects_past_deadline() {
    let h = harness();
    let owner = h.user("owner").await;
    let expired = h.open_project(owner, vec![role("Dev", 1)]).await;
    let current = h.open_project(owner, vec![role("Dev", 1)]).await;
    h.set_deadline(expired, owner, Utc::now() - Duration::hours(1)).await;
    h.set_deadline(current, owner, Utc::now() + Duration::days(3)).await;

    let open = h.engine.list_projects(Some(ProjectStatus::Open)).await.unwrap();
    assert_eq!(open.iter().map(|p| p.id).collect::<Vec<_>>(), vec![current]);

    let detail = h.engine.project_detail(expired).await.unwrap();
    assert_eq!(detail.project.status, ProjectStatus::Closed);

    let history = h.engine.project_history(expired, owner).await.unwrap();
    let close = history.last().unwrap();
    assert_eq!(close.action, ACTION_STATUS_CHANGE);
    assert_eq!(close.actor_id, None);
    assert_eq!(close.details["trigger"], TRIGGER_DEADLINE);

    assert!(h
        .sink
        .sent_to(owner)
        .await
        .iter()
        .any(|n| n.message.contains("deadline")));
}

#[tokio::test]
async fn detail_closes_expired_project_on_read() {
    let h = harness();
    let owner = h.user("owner").await;
    let id = h.open_project(owner, vec![role("Dev", 1)]).await;
    h.set_deadline(id, owner, Utc::now() - Duration::minutes(5)).await;

    let view = h.engine.project_detail(id).await.unwrap();
    assert_eq!(view.project.status, ProjectStatus::Closed);

    let again = h.engine.project_detail(id).await.unwrap();
    assert_eq!(again.project.status, ProjectStatus::Closed);
    let closes = h
        .engine
        .project_history(id, owner)
        .await
        .unwrap()
        .into_iter()
        .filter(|e| e.action == ACTION_STATUS_CHANGE)
        .count();
    assert_eq!(closes, 1);
}

#[tokio::test]
async fn stale_closed_project_is_purge_eligible() {
    let h = harness();
    let owner = h.user("owner").await;
    let id = h.open_project(owner, vec![role("Dev", 1)]).await;
    h.engine.set_project_status(id, ProjectStatus::Closed, owner).await.unwrap();

    assert!(!h.engine.project_detail(id).await.unwrap().purge_eligible);

    // Same store, no retention window: any closed project is already stale.
    let strict = ProjectEngine::new(
        h.store.clone(),
        Arc::new(NullSink),
        EngineConfig { retention: Duration::zero() },
    );
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let view = strict.project_detail(id).await.unwrap();
    assert!(view.purge_eligible);
    assert_eq!(view.project.status, ProjectStatus::Closed);
}

#[tokio::test]
async fn update_can_clear_the_deadline() {
    let h = harness();
    let owner = h.user("owner").await;
    let id = h.open_project(owner, vec![role("Dev", 1)]).await;
    h.set_deadline(id, owner, Utc::now() + Duration::days(3)).await;

    let kept = h
        .engine
        .update_project(id, owner, ProjectChanges { title: Some("Renamed".into()), ..Default::default() })
        .await
        .unwrap();
    assert!(kept.project.deadline.is_some());

    let cleared = h
        .engine
        .update_project(id, owner, ProjectChanges { deadline: Some(None), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(cleared.project.deadline, None);
    assert_eq!(cleared.project.title, "Renamed");
}
