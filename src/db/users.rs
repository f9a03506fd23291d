//! User repository.

use super::DbError;
use crate::users::models::User;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Repository for user records.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user. The username is unique across the service.
    pub async fn create(&self, username: &str, email: &str) -> Result<User, DbError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(now)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(DbError::UsernameTaken(username.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            created_at: now,
        })
    }

    /// Look up a user by id.
    pub async fn find(&self, user_id: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, (String, String, String, i64)>(
            r#"
            SELECT id, username, email, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, username, email, created_at)| User {
            id,
            username,
            email,
            created_at,
        }))
    }
}
