//! Entity records exchanged between the engine and its storage gateway.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use teamhub_core::role_fill::{DeclaredRole, RoleAssignment, RoleFill};
use teamhub_core::status::{ApplicationStatus, ProjectStatus};
use teamhub_core::types::{DbId, Timestamp};

/// Kind of team a project is recruiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectKind {
    Course,
    Hackathon,
    #[default]
    SideProject,
}

impl ProjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Course => "COURSE",
            Self::Hackathon => "HACKATHON",
            Self::SideProject => "SIDE_PROJECT",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "COURSE" => Some(Self::Course),
            "HACKATHON" => Some(Self::Hackathon),
            "SIDE_PROJECT" => Some(Self::SideProject),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub kind: ProjectKind,
    pub status: ProjectStatus,
    pub deadline: Option<Timestamp>,
    pub completion_requested: bool,
    pub completion_votes: BTreeSet<DbId>,
    pub completed_at: Option<Timestamp>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProjectRecord {
    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.owner_id == user_id
    }
}

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub kind: ProjectKind,
    pub status: ProjectStatus,
    pub deadline: Option<Timestamp>,
    pub metadata: serde_json::Value,
    pub roles: Vec<NewRole>,
}

/// Owner edits. `None` leaves a field untouched; `roles` replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<ProjectKind>,
    /// `Some(None)` clears the deadline.
    pub deadline: Option<Option<Timestamp>>,
    pub metadata: Option<serde_json::Value>,
    pub roles: Option<Vec<NewRole>>,
}

/// A project with its roles and derived lifecycle facts.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub roles: Vec<RoleRecord>,
    pub role_fill: Vec<RoleFill>,
    pub accepted_members: usize,
    pub purge_eligible: bool,
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRecord {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub count: i32,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub count: i32,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl DeclaredRole for RoleRecord {
    fn role_name(&self) -> &str {
        &self.name
    }
    fn headcount(&self) -> i32 {
        self.count
    }
}

impl DeclaredRole for NewRole {
    fn role_name(&self) -> &str {
        &self.name
    }
    fn headcount(&self) -> i32 {
        self.count
    }
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationRecord {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub role_name: String,
    pub status: ApplicationStatus,
    pub answers: BTreeMap<String, String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RoleAssignment for ApplicationRecord {
    fn assigned_role(&self) -> &str {
        &self.role_name
    }
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub project_id: DbId,
    pub user_id: DbId,
    pub role_name: String,
    pub answers: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Reputation & audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReputationRecord {
    pub user_id: DbId,
    pub completed_project_count: i32,
    pub badges: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub project_id: DbId,
    pub actor_id: Option<DbId>,
    pub action: String,
    pub old_status: Option<ProjectStatus>,
    pub new_status: Option<ProjectStatus>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub project_id: DbId,
    /// `None` for system-triggered entries.
    pub actor_id: Option<DbId>,
    pub action: &'static str,
    pub old_status: Option<ProjectStatus>,
    pub new_status: Option<ProjectStatus>,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

impl NewAuditEntry {
    pub fn new(project_id: DbId, action: &'static str, at: Timestamp) -> Self {
        Self {
            project_id,
            actor_id: None,
            action,
            old_status: None,
            new_status: None,
            details: serde_json::Value::Object(Default::default()),
            created_at: at,
        }
    }

    pub fn by(mut self, actor_id: DbId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    pub fn status_change(mut self, old: ProjectStatus, new: ProjectStatus) -> Self {
        self.old_status = Some(old);
        self.new_status = Some(new);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
