//! Repositories for `users` and `user_badges`.

use sqlx::PgConnection;
use teamhub_core::types::DbId;

use crate::models::user::User;

const COLUMNS: &str = "id, username, completed_project_count, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    pub async fn create(conn: &mut PgConnection, username: &str) -> Result<User, sqlx::Error> {
        let query = format!("INSERT INTO users (username) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn exists(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Bump the completed-project counter. Returns the new value, or `None`
    /// if the user does not exist.
    pub async fn increment_completed_count(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE users \
             SET completed_project_count = completed_project_count + 1, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING completed_project_count",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }
}

pub struct BadgeRepo;

impl BadgeRepo {
    /// Insert a badge. Returns `false` if the user already held it.
    pub async fn add(conn: &mut PgConnection, user_id: DbId, badge: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_badges (user_id, badge) VALUES ($1, $2) \
             ON CONFLICT (user_id, badge) DO NOTHING",
        )
        .bind(user_id)
        .bind(badge)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Badges held by a user, alphabetically.
    pub async fn list_for_user(conn: &mut PgConnection, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT badge FROM user_badges WHERE user_id = $1 ORDER BY badge",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }
}
