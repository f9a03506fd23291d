//! Category repository.

use super::DbError;
use crate::categories::models::Category;
use sqlx::SqlitePool;
use uuid::Uuid;

type CategoryRow = (String, String, String, bool, i64);

fn category_from_row(row: CategoryRow) -> Category {
    let (id, room_id, name, is_default, created_at) = row;
    Category {
        id,
        room_id,
        name,
        is_default,
        created_at,
    }
}

/// Repository for expense categories.
pub struct CategoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Categories of a room, defaults first in seed order.
    pub async fn for_room(&self, room_id: &str) -> Result<Vec<Category>, DbError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, room_id, name, is_default, created_at
            FROM categories
            WHERE room_id = ?
            ORDER BY is_default DESC, created_at, name
            "#,
        )
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(category_from_row).collect())
    }

    /// Create a category. The name is unique within the room.
    pub async fn create(&self, room_id: &str, name: &str) -> Result<Category, DbError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO categories (id, room_id, name, is_default, created_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(&id)
        .bind(room_id)
        .bind(name)
        .bind(now)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(DbError::CategoryExists(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Category {
            id,
            room_id: room_id.to_string(),
            name: name.to_string(),
            is_default: false,
            created_at: now,
        })
    }

    /// Look up a category by id.
    pub async fn find(&self, category_id: &str) -> Result<Option<Category>, DbError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, room_id, name, is_default, created_at
            FROM categories
            WHERE id = ?
            "#,
        )
        .bind(category_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(category_from_row))
    }

    /// Rename a category. The new name must stay unique within the room.
    pub async fn rename(&self, category_id: &str, name: &str) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(category_id)
            .execute(self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DbError::CategoryExists(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
