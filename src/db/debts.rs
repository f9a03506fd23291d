//! Debt repository and the split-to-debt netting rule.

use super::DbError;
use crate::debts::models::Debt;
use crate::rooms::models::RoomMember;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// Fold one split into the room's netted debts.
///
/// For a split where `debtor` owes `creditor` the given amount:
/// 1. an existing debtor→creditor debt grows by the amount (deleted if it
///    lands on zero),
/// 2. else an existing creditor→debtor debt shrinks by it; at zero it is
///    deleted, below zero it is replaced by the reversed remainder,
/// 3. else a fresh debtor→creditor debt is created.
pub(crate) async fn apply_split_debt(
    conn: &mut SqliteConnection,
    room_id: &str,
    debtor_id: &str,
    creditor_id: &str,
    amount_cents: i64,
) -> Result<(), DbError> {
    let now = chrono::Utc::now().timestamp();

    let forward = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT id, amount_cents FROM debts
        WHERE room_id = ? AND debtor_id = ? AND creditor_id = ?
        "#,
    )
    .bind(room_id)
    .bind(debtor_id)
    .bind(creditor_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((id, existing)) = forward {
        let new_amount = existing + amount_cents;
        if new_amount == 0 {
            sqlx::query("DELETE FROM debts WHERE id = ?")
                .bind(&id)
                .execute(&mut *conn)
                .await?;
        } else {
            sqlx::query("UPDATE debts SET amount_cents = ?, last_updated = ? WHERE id = ?")
                .bind(new_amount)
                .bind(now)
                .bind(&id)
                .execute(&mut *conn)
                .await?;
        }
        return Ok(());
    }

    let reverse = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT id, amount_cents FROM debts
        WHERE room_id = ? AND debtor_id = ? AND creditor_id = ?
        "#,
    )
    .bind(room_id)
    .bind(creditor_id)
    .bind(debtor_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((id, existing)) = reverse {
        let remaining = existing - amount_cents;
        if remaining == 0 {
            sqlx::query("DELETE FROM debts WHERE id = ?")
                .bind(&id)
                .execute(&mut *conn)
                .await?;
        } else if remaining < 0 {
            // The direction flips: the old creditor now owes the remainder.
            sqlx::query("DELETE FROM debts WHERE id = ?")
                .bind(&id)
                .execute(&mut *conn)
                .await?;
            insert_debt(conn, room_id, debtor_id, creditor_id, -remaining, now).await?;
        } else {
            sqlx::query("UPDATE debts SET amount_cents = ?, last_updated = ? WHERE id = ?")
                .bind(remaining)
                .bind(now)
                .bind(&id)
                .execute(&mut *conn)
                .await?;
        }
        return Ok(());
    }

    insert_debt(conn, room_id, debtor_id, creditor_id, amount_cents, now).await
}

async fn insert_debt(
    conn: &mut SqliteConnection,
    room_id: &str,
    debtor_id: &str,
    creditor_id: &str,
    amount_cents: i64,
    now: i64,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO debts (id, room_id, debtor_id, creditor_id, amount_cents, last_updated)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(room_id)
    .bind(debtor_id)
    .bind(creditor_id)
    .bind(amount_cents)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Outcome of a debt payment.
pub enum PaymentOutcome {
    /// The payment covered the whole debt; the row is gone.
    Settled,
    /// A partial payment; the updated debt remains.
    Remaining(Debt),
}

type DebtTuple = (
    String,
    String,
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
);

fn debt_from_row(row: DebtTuple) -> Debt {
    let (
        id,
        room_id,
        amount_cents,
        last_updated,
        debtor_id,
        debtor_room_id,
        debtor_user_id,
        debtor_icon,
        debtor_name,
        debtor_joined_at,
        creditor_id,
        creditor_room_id,
        creditor_user_id,
        creditor_icon,
        creditor_name,
        creditor_joined_at,
    ) = row;

    Debt {
        id,
        room_id,
        debtor: RoomMember {
            id: debtor_id,
            room_id: debtor_room_id,
            user_id: debtor_user_id,
            icon: debtor_icon,
            name: debtor_name,
            joined_at: debtor_joined_at,
        },
        creditor: RoomMember {
            id: creditor_id,
            room_id: creditor_room_id,
            user_id: creditor_user_id,
            icon: creditor_icon,
            name: creditor_name,
            joined_at: creditor_joined_at,
        },
        amount_cents,
        last_updated,
        related_to_me: false,
    }
}

const DEBT_SELECT: &str = r#"
    SELECT d.id, d.room_id, d.amount_cents, d.last_updated,
           deb.id, deb.room_id, deb.user_id, deb.icon, deb.name, deb.joined_at,
           cred.id, cred.room_id, cred.user_id, cred.icon, cred.name, cred.joined_at
    FROM debts d
    JOIN room_members deb ON deb.id = d.debtor_id
    JOIN room_members cred ON cred.id = d.creditor_id
"#;

/// Repository for netted debts.
pub struct DebtRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DebtRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All debts of a room with member records embedded.
    pub async fn debts_for_room(&self, room_id: &str) -> Result<Vec<Debt>, DbError> {
        let sql = format!("{DEBT_SELECT} WHERE d.room_id = ? ORDER BY d.last_updated DESC, d.id");
        let rows = sqlx::query_as::<_, DebtTuple>(&sql)
            .bind(room_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(debt_from_row).collect())
    }

    /// A debt by id, scoped to a room.
    pub async fn find(&self, debt_id: &str, room_id: &str) -> Result<Option<Debt>, DbError> {
        let sql = format!("{DEBT_SELECT} WHERE d.id = ? AND d.room_id = ?");
        let row = sqlx::query_as::<_, DebtTuple>(&sql)
            .bind(debt_id)
            .bind(room_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(debt_from_row))
    }

    /// Pay down a debt. The outstanding amount is re-read inside the
    /// transaction, so a payment raced against another never overshoots.
    pub async fn pay(&self, debt_id: &str, amount_cents: i64) -> Result<PaymentOutcome, DbError> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        let outstanding: Option<i64> =
            sqlx::query_scalar("SELECT amount_cents FROM debts WHERE id = ?")
                .bind(debt_id)
                .fetch_optional(&mut *tx)
                .await?;

        let outstanding = match outstanding {
            Some(amount) => amount,
            None => return Err(DbError::Internal(format!("debt {debt_id} vanished"))),
        };

        if amount_cents > outstanding {
            return Err(DbError::PaymentTooLarge);
        }

        if amount_cents == outstanding {
            sqlx::query("DELETE FROM debts WHERE id = ?")
                .bind(debt_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(PaymentOutcome::Settled);
        }

        sqlx::query("UPDATE debts SET amount_cents = amount_cents - ?, last_updated = ? WHERE id = ?")
            .bind(amount_cents)
            .bind(now)
            .bind(debt_id)
            .execute(&mut *tx)
            .await?;

        let sql = format!("{DEBT_SELECT} WHERE d.id = ?");
        let row = sqlx::query_as::<_, DebtTuple>(&sql)
            .bind(debt_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PaymentOutcome::Remaining(debt_from_row(row)))
    }
}
