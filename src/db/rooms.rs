//! Room and membership repository.

use super::DbError;
use crate::categories::DEFAULT_CATEGORIES;
use crate::rooms::models::{Room, RoomMember};
use sqlx::SqlitePool;
use uuid::Uuid;

type RoomRow = (String, String, String, String, String, i64);
type MemberRow = (String, String, String, String, String, i64);

fn room_from_row(row: RoomRow) -> Room {
    let (id, name, icon, creator_id, invite_code, created_at) = row;
    Room {
        id,
        name,
        icon,
        creator_id,
        invite_code,
        created_at,
    }
}

fn member_from_row(row: MemberRow) -> RoomMember {
    let (id, room_id, user_id, icon, name, joined_at) = row;
    RoomMember {
        id,
        room_id,
        user_id,
        icon,
        name,
        joined_at,
    }
}

/// Repository for rooms and their memberships.
pub struct RoomRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RoomRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a room, enroll the creator as its first member, and seed the
    /// default categories, all in one transaction.
    pub async fn create(
        &self,
        name: &str,
        icon: Option<&str>,
        creator_id: &str,
        member_name: &str,
        member_icon: Option<&str>,
    ) -> Result<(Room, RoomMember), DbError> {
        let room_id = Uuid::new_v4().to_string();
        let member_id = Uuid::new_v4().to_string();
        let invite_code: String = Uuid::new_v4().to_string().chars().take(8).collect();
        let icon = icon.unwrap_or("🏠");
        let member_icon = member_icon.unwrap_or("👤");
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rooms (id, name, icon, creator_id, invite_code, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&room_id)
        .bind(name)
        .bind(icon)
        .bind(creator_id)
        .bind(&invite_code)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO room_members (id, room_id, user_id, icon, name, joined_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member_id)
        .bind(&room_id)
        .bind(creator_id)
        .bind(member_icon)
        .bind(member_name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for category_name in DEFAULT_CATEGORIES {
            sqlx::query(
                r#"
                INSERT INTO categories (id, room_id, name, is_default, created_at)
                VALUES (?, ?, ?, 1, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&room_id)
            .bind(category_name)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let room = Room {
            id: room_id,
            name: name.to_string(),
            icon: icon.to_string(),
            creator_id: creator_id.to_string(),
            invite_code,
            created_at: now,
        };
        let member = RoomMember {
            id: member_id,
            room_id: room.id.clone(),
            user_id: creator_id.to_string(),
            icon: member_icon.to_string(),
            name: member_name.to_string(),
            joined_at: now,
        };

        Ok((room, member))
    }

    /// Look up a room by id.
    pub async fn find(&self, room_id: &str) -> Result<Option<Room>, DbError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, name, icon, creator_id, invite_code, created_at
            FROM rooms
            WHERE id = ?
            "#,
        )
        .bind(room_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(room_from_row))
    }

    /// Look up a room by its invite code.
    pub async fn find_by_invite_code(&self, code: &str) -> Result<Option<Room>, DbError> {
        let row = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT id, name, icon, creator_id, invite_code, created_at
            FROM rooms
            WHERE invite_code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(room_from_row))
    }

    /// Rooms the user belongs to, oldest membership first.
    pub async fn rooms_for_user(&self, user_id: &str) -> Result<Vec<Room>, DbError> {
        let rows = sqlx::query_as::<_, RoomRow>(
            r#"
            SELECT r.id, r.name, r.icon, r.creator_id, r.invite_code, r.created_at
            FROM rooms r
            JOIN room_members m ON m.room_id = r.id
            WHERE m.user_id = ?
            ORDER BY m.joined_at, r.id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(room_from_row).collect())
    }

    /// Enroll a user into a room. The (room, user) pair is unique.
    pub async fn add_member(
        &self,
        room_id: &str,
        user_id: &str,
        name: &str,
        icon: Option<&str>,
    ) -> Result<RoomMember, DbError> {
        let id = Uuid::new_v4().to_string();
        let icon = icon.unwrap_or("👤");
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO room_members (id, room_id, user_id, icon, name, joined_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(room_id)
        .bind(user_id)
        .bind(icon)
        .bind(name)
        .bind(now)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(DbError::AlreadyMember);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(RoomMember {
            id,
            room_id: room_id.to_string(),
            user_id: user_id.to_string(),
            icon: icon.to_string(),
            name: name.to_string(),
            joined_at: now,
        })
    }

    /// The user's membership in a room, if any.
    pub async fn membership(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<RoomMember>, DbError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, room_id, user_id, icon, name, joined_at
            FROM room_members
            WHERE room_id = ? AND user_id = ?
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(member_from_row))
    }

    /// All members of a room, in join order.
    pub async fn members_of(&self, room_id: &str) -> Result<Vec<RoomMember>, DbError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, room_id, user_id, icon, name, joined_at
            FROM room_members
            WHERE room_id = ?
            ORDER BY joined_at, id
            "#,
        )
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(member_from_row).collect())
    }

    /// A member record by id, scoped to a room.
    pub async fn member_of_room(
        &self,
        member_id: &str,
        room_id: &str,
    ) -> Result<Option<RoomMember>, DbError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, room_id, user_id, icon, name, joined_at
            FROM room_members
            WHERE id = ? AND room_id = ?
            "#,
        )
        .bind(member_id)
        .bind(room_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(member_from_row))
    }

    /// Remove a membership. Cascades to the member's splits and debts.
    pub async fn remove_member(&self, membership_id: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM room_members WHERE id = ?")
            .bind(membership_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
