//! Shopping list and list item repository.

use super::DbError;
use crate::lists::models::ShoppingListItem;
use crate::users::models::User;
use sqlx::SqlitePool;
use uuid::Uuid;

/// A shopping list row without its items.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub id: String,
    pub room_id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub position: i64,
}

type ListTuple = (String, String, String, String, i64, i64, i64);

fn list_from_row(row: ListTuple) -> ListRow {
    let (id, room_id, name, created_by, created_at, updated_at, position) = row;
    ListRow {
        id,
        room_id,
        name,
        created_by,
        created_at,
        updated_at,
        position,
    }
}

type ItemTuple = (
    String,
    String,
    String,
    i64,
    bool,
    i64,
    Option<i64>,
    Option<String>,
    i64,
    String,
    String,
    String,
    i64,
);

fn item_from_row(row: ItemTuple) -> ShoppingListItem {
    let (
        id,
        list_id,
        name,
        quantity,
        is_purchased,
        added_at,
        purchased_at,
        memo,
        position,
        user_id,
        username,
        email,
        user_created_at,
    ) = row;
    ShoppingListItem {
        id,
        list_id,
        name,
        quantity,
        is_purchased,
        added_by: User {
            id: user_id,
            username,
            email,
            created_at: user_created_at,
        },
        added_at,
        purchased_at,
        memo,
        position,
    }
}

/// Repository for shopping lists and their items.
pub struct ListRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ListRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a list at the end of the room's ordering.
    pub async fn create(
        &self,
        room_id: &str,
        name: &str,
        created_by: &str,
    ) -> Result<ListRow, DbError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        let position: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shopping_lists WHERE room_id = ?")
                .bind(room_id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            r#"
            INSERT INTO shopping_lists (id, room_id, name, created_by, created_at, updated_at, position)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(room_id)
        .bind(name)
        .bind(created_by)
        .bind(now)
        .bind(now)
        .bind(position)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ListRow {
            id,
            room_id: room_id.to_string(),
            name: name.to_string(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            position,
        })
    }

    /// Look up a list by id.
    pub async fn find(&self, list_id: &str) -> Result<Option<ListRow>, DbError> {
        let row = sqlx::query_as::<_, ListTuple>(
            r#"
            SELECT id, room_id, name, created_by, created_at, updated_at, position
            FROM shopping_lists
            WHERE id = ?
            "#,
        )
        .bind(list_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(list_from_row))
    }

    /// Lists of a room in display order.
    pub async fn lists_for_room(&self, room_id: &str) -> Result<Vec<ListRow>, DbError> {
        let rows = sqlx::query_as::<_, ListTuple>(
            r#"
            SELECT id, room_id, name, created_by, created_at, updated_at, position
            FROM shopping_lists
            WHERE room_id = ?
            ORDER BY position, created_at
            "#,
        )
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(list_from_row).collect())
    }

    /// Ids of all lists of a room.
    pub async fn list_ids_for_room(&self, room_id: &str) -> Result<Vec<String>, DbError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM shopping_lists WHERE room_id = ?",
        )
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }

    /// Reassign list positions by array index.
    pub async fn set_list_positions(&self, list_ids: &[String]) -> Result<(), DbError> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        for (position, list_id) in list_ids.iter().enumerate() {
            sqlx::query("UPDATE shopping_lists SET position = ?, updated_at = ? WHERE id = ?")
                .bind(position as i64)
                .bind(now)
                .bind(list_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a list. Cascades to its items.
    pub async fn delete(&self, list_id: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM shopping_lists WHERE id = ?")
            .bind(list_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Items of a list in display order, with the adding user embedded.
    pub async fn items_for_list(&self, list_id: &str) -> Result<Vec<ShoppingListItem>, DbError> {
        let rows = sqlx::query_as::<_, ItemTuple>(
            r#"
            SELECT i.id, i.list_id, i.name, i.quantity, i.is_purchased, i.added_at,
                   i.purchased_at, i.memo, i.position,
                   u.id, u.username, u.email, u.created_at
            FROM shopping_list_items i
            JOIN users u ON u.id = i.added_by
            WHERE i.list_id = ?
            ORDER BY i.position, i.added_at
            "#,
        )
        .bind(list_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(item_from_row).collect())
    }

    /// Create an item at the end of the list's ordering.
    pub async fn create_item(
        &self,
        list_id: &str,
        name: &str,
        quantity: i64,
        memo: Option<&str>,
        added_by: &User,
    ) -> Result<ShoppingListItem, DbError> {
        let id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        let position: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shopping_list_items WHERE list_id = ?")
                .bind(list_id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            r#"
            INSERT INTO shopping_list_items
                (id, list_id, name, quantity, is_purchased, added_by, added_at, purchased_at, memo, position)
            VALUES (?, ?, ?, ?, 0, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(list_id)
        .bind(name)
        .bind(quantity)
        .bind(&added_by.id)
        .bind(now)
        .bind(memo)
        .bind(position)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ShoppingListItem {
            id,
            list_id: list_id.to_string(),
            name: name.to_string(),
            quantity,
            is_purchased: false,
            added_by: added_by.clone(),
            added_at: now,
            purchased_at: None,
            memo: memo.map(|m| m.to_string()),
            position,
        })
    }

    /// Look up an item by id, along with the room its list belongs to.
    pub async fn find_item(
        &self,
        item_id: &str,
    ) -> Result<Option<(ShoppingListItem, String)>, DbError> {
        #[allow(clippy::type_complexity)]
        let row: Option<(
            String,
            String,
            String,
            i64,
            bool,
            i64,
            Option<i64>,
            Option<String>,
            i64,
            String,
            String,
            String,
            i64,
            String,
        )> = sqlx::query_as(
            r#"
            SELECT i.id, i.list_id, i.name, i.quantity, i.is_purchased, i.added_at,
                   i.purchased_at, i.memo, i.position,
                   u.id, u.username, u.email, u.created_at,
                   l.room_id
            FROM shopping_list_items i
            JOIN users u ON u.id = i.added_by
            JOIN shopping_lists l ON l.id = i.list_id
            WHERE i.id = ?
            "#,
        )
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(
            |(
                id,
                list_id,
                name,
                quantity,
                is_purchased,
                added_at,
                purchased_at,
                memo,
                position,
                user_id,
                username,
                email,
                user_created_at,
                room_id,
            )| {
                let item = item_from_row((
                    id,
                    list_id,
                    name,
                    quantity,
                    is_purchased,
                    added_at,
                    purchased_at,
                    memo,
                    position,
                    user_id,
                    username,
                    email,
                    user_created_at,
                ));
                (item, room_id)
            },
        ))
    }

    /// Update an item's editable fields.
    pub async fn update_item(
        &self,
        item_id: &str,
        name: &str,
        quantity: i64,
        memo: Option<&str>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE shopping_list_items SET name = ?, quantity = ?, memo = ? WHERE id = ?",
        )
        .bind(name)
        .bind(quantity)
        .bind(memo)
        .bind(item_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Set an item's purchased flag and timestamp.
    pub async fn set_item_purchased(
        &self,
        item_id: &str,
        is_purchased: bool,
        purchased_at: Option<i64>,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE shopping_list_items SET is_purchased = ?, purchased_at = ? WHERE id = ?",
        )
        .bind(is_purchased)
        .bind(purchased_at)
        .bind(item_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Ids of all items of a list.
    pub async fn item_ids_for_list(&self, list_id: &str) -> Result<Vec<String>, DbError> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM shopping_list_items WHERE list_id = ?",
        )
        .bind(list_id)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }

    /// Reassign item positions by array index.
    pub async fn set_item_positions(&self, item_ids: &[String]) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        for (position, item_id) in item_ids.iter().enumerate() {
            sqlx::query("UPDATE shopping_list_items SET position = ? WHERE id = ?")
                .bind(position as i64)
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete an item.
    pub async fn delete_item(&self, item_id: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM shopping_list_items WHERE id = ?")
            .bind(item_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
