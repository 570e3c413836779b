//! Shared harness for engine integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use teamhub_core::status::{ApplicationStatus, ProjectStatus};
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::memory::{InMemoryGateway, RecordingSink};
use teamhub_engine::records::{NewProject, NewRole, ProjectChanges, ProjectKind};
use teamhub_engine::{EngineConfig, NotificationSink, ProjectEngine};

pub struct Harness {
    pub engine: ProjectEngine<InMemoryGateway>,
    pub store: InMemoryGateway,
    pub sink: Arc<RecordingSink>,
}

pub fn harness() -> Harness {
    let sink = Arc::new(RecordingSink::new());
    harness_with_sink(sink.clone(), sink)
}

/// Harness whose engine delivers to `engine_sink`; `sink` is kept for
/// inspection only.
pub fn harness_with_sink(engine_sink: Arc<dyn NotificationSink>, sink: Arc<RecordingSink>) -> Harness {
    let store = InMemoryGateway::new();
    let engine = ProjectEngine::new(store.clone(), engine_sink, EngineConfig::default());
    Harness {
        engine,
        store,
        sink,
    }
}

pub fn role(name: &str, count: i32) -> NewRole {
    NewRole {
        name: name.to_string(),
        count,
        skills: Vec::new(),
    }
}

pub fn new_project(title: &str, status: ProjectStatus, roles: Vec<NewRole>) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: Some("integration test".to_string()),
        kind: ProjectKind::Hackathon,
        status,
        deadline: None,
        metadata: serde_json::json!({}),
        roles,
    }
}

pub fn answers() -> BTreeMap<String, String> {
    BTreeMap::from([("Why?".to_string(), "I like building things".to_string())])
}

impl Harness {
    /// Register a user; `_name` only labels the call site.
    pub async fn user(&self, _name: &str) -> DbId {
        self.store.add_user().await
    }

    /// Set a project's deadline through an owner edit.
    pub async fn set_deadline(&self, project_id: DbId, owner: DbId, deadline: Timestamp) {
        self.engine
            .update_project(
                project_id,
                owner,
                ProjectChanges {
                    deadline: Some(Some(deadline)),
                    ..Default::default()
                },
            )
            .await
            .expect("owner should be able to edit the deadline");
    }

    /// An `OPEN` project owned by `owner` with the given roles.
    pub async fn open_project(&self, owner: DbId, roles: Vec<NewRole>) -> DbId {
        self.engine
            .create_project(owner, new_project("Team project", ProjectStatus::Open, roles))
            .await
            .expect("project should be created")
            .project
            .id
    }

    /// Apply as `user` for `role_name`, returning the application id.
    pub async fn apply(&self, project_id: DbId, user: DbId, role_name: &str) -> DbId {
        self.engine
            .apply(project_id, user, role_name.to_string(), answers())
            .await
            .expect("application should be accepted for review")
            .id
    }

    /// Create a user, apply and get accepted. Returns the user id.
    pub async fn member(&self, project_id: DbId, owner: DbId, name: &str, role_name: &str) -> DbId {
        let user = self.user(name).await;
        let app = self.apply(project_id, user, role_name).await;
        self.engine
            .set_application_status(app, ApplicationStatus::Accepted, owner)
            .await
            .expect("owner should be able to accept");
        user
    }
}
