//! Application rows.

use std::collections::BTreeMap;

use sqlx::types::Json;
use sqlx::FromRow;
use teamhub_core::error::CoreError;
use teamhub_core::status::{ApplicationStatus, StatusId};
use teamhub_core::types::{DbId, Timestamp};
use teamhub_engine::records::ApplicationRecord;

/// A row from the `applications` table.
#[derive(Debug, Clone, FromRow)]
pub struct Application {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub role_name: String,
    pub status_id: StatusId,
    pub answers: Json<BTreeMap<String, String>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<Application> for ApplicationRecord {
    type Error = CoreError;

    fn try_from(row: Application) -> Result<Self, Self::Error> {
        Ok(ApplicationRecord {
            id: row.id,
            project_id: row.project_id,
            user_id: row.user_id,
            role_name: row.role_name,
            status: ApplicationStatus::from_id(row.status_id)?,
            answers: row.answers.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
