//! Receipt repository.
//!
//! Receipt commit is a single transaction: the receipt row, its line items,
//! find-or-create of categories, the per-member splits, and the folding of
//! every split into the room's netted debts either all land or none do.

use super::debts::apply_split_debt;
use super::DbError;
use crate::categories::models::Category;
use crate::history::models::{HistorySort, SortOrder};
use crate::receipts::helpers::round_half_up_div;
use crate::receipts::models::{NewReceipt, Receipt, ReceiptItem, ReceiptSplit, SplitSpec};
use crate::rooms::models::RoomMember;
use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

/// One row of the purchase history listing, flattened for the API.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub id: String,
    /// The acting member's split amount; absent in the room-wide view.
    pub amount_cents: Option<i64>,
    pub name: String,
    pub general_name: String,
    pub quantity: f64,
    pub price_cents: i64,
    pub actual_price_cents: i64,
    pub category: Option<Category>,
    pub receipt_name: String,
    pub purchase_date: NaiveDate,
}

type SplitTuple = (
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
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
);

fn split_from_row(row: SplitTuple) -> ReceiptSplit {
    let (
        id,
        receipt_item_id,
        amount_cents,
        created_at,
        member_id,
        member_room_id,
        member_user_id,
        member_icon,
        member_name,
        member_joined_at,
        paid_id,
        paid_room_id,
        paid_user_id,
        paid_icon,
        paid_name,
        paid_joined_at,
    ) = row;

    let paid_by = match (paid_id, paid_room_id, paid_user_id, paid_icon, paid_name, paid_joined_at)
    {
        (Some(id), Some(room_id), Some(user_id), Some(icon), Some(name), Some(joined_at)) => {
            Some(RoomMember {
                id,
                room_id,
                user_id,
                icon,
                name,
                joined_at,
            })
        }
        _ => None,
    };

    ReceiptSplit {
        id,
        receipt_item_id,
        member: RoomMember {
            id: member_id,
            room_id: member_room_id,
            user_id: member_user_id,
            icon: member_icon,
            name: member_name,
            joined_at: member_joined_at,
        },
        amount_cents,
        paid_by,
        created_at,
    }
}

type ItemTuple = (
    String,
    String,
    String,
    String,
    f64,
    i64,
    i64,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<bool>,
    Option<i64>,
);

type HistoryTuple = (
    String,
    Option<i64>,
    String,
    String,
    f64,
    i64,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<bool>,
    Option<i64>,
    String,
    NaiveDate,
);

fn item_from_row(row: ItemTuple, splits: Vec<ReceiptSplit>) -> ReceiptItem {
    let (
        id,
        receipt_id,
        name,
        general_name,
        quantity,
        price_cents,
        actual_price_cents,
        added_at,
        cat_id,
        cat_room_id,
        cat_name,
        cat_is_default,
        cat_created_at,
    ) = row;

    let category = match (cat_id, cat_room_id, cat_name, cat_is_default, cat_created_at) {
        (Some(id), Some(room_id), Some(name), Some(is_default), Some(created_at)) => {
            Some(Category {
                id,
                room_id,
                name,
                is_default,
                created_at,
            })
        }
        _ => None,
    };

    ReceiptItem {
        id,
        receipt_id,
        category,
        name,
        general_name,
        quantity,
        price_cents,
        actual_price_cents,
        added_at,
        splits,
    }
}

async fn find_or_create_category(
    conn: &mut SqliteConnection,
    room_id: &str,
    name: &str,
    now: i64,
) -> Result<Category, DbError> {
    let existing = sqlx::query_as::<_, (String, String, String, bool, i64)>(
        r#"
        SELECT id, room_id, name, is_default, created_at
        FROM categories
        WHERE room_id = ? AND name = ?
        "#,
    )
    .bind(room_id)
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((id, room_id, name, is_default, created_at)) = existing {
        return Ok(Category {
            id,
            room_id,
            name,
            is_default,
            created_at,
        });
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO categories (id, room_id, name, is_default, created_at)
        VALUES (?, ?, ?, 0, ?)
        "#,
    )
    .bind(&id)
    .bind(room_id)
    .bind(name)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Category {
        id,
        room_id: room_id.to_string(),
        name: name.to_string(),
        is_default: false,
        created_at: now,
    })
}

/// Repository for receipts, their splits, and expense aggregation.
pub struct ReceiptRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReceiptRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Commit a validated receipt: rows, splits, and debt netting in one
    /// transaction. Returns the receipt with items and splits embedded.
    pub async fn create(
        &self,
        room_id: &str,
        uploaded_by: &str,
        data: &NewReceipt,
    ) -> Result<Receipt, DbError> {
        let receipt_id = Uuid::new_v4().to_string();
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        let members = sqlx::query_as::<_, (String, String, String, String, String, i64)>(
            r#"
            SELECT id, room_id, user_id, icon, name, joined_at
            FROM room_members
            WHERE room_id = ?
            ORDER BY joined_at, id
            "#,
        )
        .bind(room_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(id, room_id, user_id, icon, name, joined_at)| RoomMember {
            id,
            room_id,
            user_id,
            icon,
            name,
            joined_at,
        })
        .collect::<Vec<_>>();

        sqlx::query(
            r#"
            INSERT INTO receipts
                (id, room_id, name, total_amount_cents, subtotal_cents, tax_amount_cents,
                 tax_rate, discount_amount_cents, discount_rate, purchase_date,
                 uploaded_by, error, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&receipt_id)
        .bind(room_id)
        .bind(&data.name)
        .bind(data.total_amount_cents)
        .bind(data.subtotal_cents)
        .bind(data.tax_amount_cents)
        .bind(data.tax_rate)
        .bind(data.discount_amount_cents)
        .bind(data.discount_rate)
        .bind(data.purchase_date)
        .bind(uploaded_by)
        .bind(&data.error)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut items_out = Vec::with_capacity(data.items.len());

        for item in &data.items {
            let category = find_or_create_category(&mut *tx, room_id, &item.category, now).await?;

            let paid_by = members
                .iter()
                .find(|m| m.id == item.paid_by_id)
                .ok_or_else(|| DbError::MemberNotFound(item.paid_by_id.clone()))?
                .clone();

            let item_id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO receipt_items
                    (id, receipt_id, category_id, name, general_name, quantity,
                     price_cents, actual_price_cents, added_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&item_id)
            .bind(&receipt_id)
            .bind(&category.id)
            .bind(&item.name)
            .bind(&item.general_name)
            .bind(item.quantity)
            .bind(item.price_cents)
            .bind(item.actual_price_cents)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            // Work out who owes what for this line item.
            let shares: Vec<(RoomMember, i64)> = match &item.split {
                SplitSpec::Evenly => {
                    let share = round_half_up_div(item.actual_price_cents, members.len() as i64);
                    members.iter().map(|m| (m.clone(), share)).collect()
                }
                SplitSpec::ByUser { member_id } => {
                    let member = members
                        .iter()
                        .find(|m| m.id == *member_id)
                        .ok_or_else(|| DbError::MemberNotFound(member_id.clone()))?
                        .clone();
                    vec![(member, item.actual_price_cents)]
                }
            };

            let mut splits_out = Vec::with_capacity(shares.len());
            for (member, amount_cents) in shares {
                let split_id = Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO receipt_item_splits
                        (id, receipt_item_id, member_id, amount_cents, paid_by, created_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&split_id)
                .bind(&item_id)
                .bind(&member.id)
                .bind(amount_cents)
                .bind(&paid_by.id)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                if member.id != paid_by.id {
                    apply_split_debt(&mut *tx, room_id, &member.id, &paid_by.id, amount_cents)
                        .await?;
                }

                splits_out.push(ReceiptSplit {
                    id: split_id,
                    receipt_item_id: item_id.clone(),
                    member,
                    amount_cents,
                    paid_by: Some(paid_by.clone()),
                    created_at: now,
                });
            }

            items_out.push(ReceiptItem {
                id: item_id,
                receipt_id: receipt_id.clone(),
                category: Some(category),
                name: item.name.clone(),
                general_name: item.general_name.clone(),
                quantity: item.quantity,
                price_cents: item.price_cents,
                actual_price_cents: item.actual_price_cents,
                added_at: now,
                splits: splits_out,
            });
        }

        tx.commit().await?;

        Ok(Receipt {
            id: receipt_id,
            room_id: room_id.to_string(),
            name: data.name.clone(),
            total_amount_cents: data.total_amount_cents,
            subtotal_cents: data.subtotal_cents,
            tax_amount_cents: data.tax_amount_cents,
            tax_rate: data.tax_rate,
            discount_amount_cents: data.discount_amount_cents,
            discount_rate: data.discount_rate,
            purchase_date: data.purchase_date,
            uploaded_by: uploaded_by.to_string(),
            error: data.error.clone(),
            created_at: now,
            updated_at: now,
            items: items_out,
        })
    }

    /// Whether a receipt exists within the given room.
    pub async fn exists_in_room(&self, receipt_id: &str, room_id: &str) -> Result<bool, DbError> {
        let row = sqlx::query_scalar::<_, String>(
            "SELECT id FROM receipts WHERE id = ? AND room_id = ?",
        )
        .bind(receipt_id)
        .bind(room_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// All splits of a receipt, with member records embedded.
    pub async fn splits_for_receipt(
        &self,
        receipt_id: &str,
    ) -> Result<Vec<ReceiptSplit>, DbError> {
        let rows = sqlx::query_as::<_, SplitTuple>(
            r#"
            SELECT s.id, s.receipt_item_id, s.amount_cents, s.created_at,
                   m.id, m.room_id, m.user_id, m.icon, m.name, m.joined_at,
                   p.id, p.room_id, p.user_id, p.icon, p.name, p.joined_at
            FROM receipt_item_splits s
            JOIN receipt_items ri ON ri.id = s.receipt_item_id
            JOIN room_members m ON m.id = s.member_id
            LEFT JOIN room_members p ON p.id = s.paid_by
            WHERE ri.receipt_id = ?
            ORDER BY s.created_at, s.id
            "#,
        )
        .bind(receipt_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(split_from_row).collect())
    }

    /// A receipt item with its category and splits embedded.
    pub async fn item_with_splits(&self, item_id: &str) -> Result<Option<ReceiptItem>, DbError> {
        let row = sqlx::query_as::<_, ItemTuple>(
            r#"
            SELECT ri.id, ri.receipt_id, ri.name, ri.general_name, ri.quantity,
                   ri.price_cents, ri.actual_price_cents, ri.added_at,
                   c.id, c.room_id, c.name, c.is_default, c.created_at
            FROM receipt_items ri
            LEFT JOIN categories c ON c.id = ri.category_id
            WHERE ri.id = ?
            "#,
        )
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let splits = sqlx::query_as::<_, SplitTuple>(
            r#"
            SELECT s.id, s.receipt_item_id, s.amount_cents, s.created_at,
                   m.id, m.room_id, m.user_id, m.icon, m.name, m.joined_at,
                   p.id, p.room_id, p.user_id, p.icon, p.name, p.joined_at
            FROM receipt_item_splits s
            JOIN room_members m ON m.id = s.member_id
            LEFT JOIN room_members p ON p.id = s.paid_by
            WHERE s.receipt_item_id = ?
            ORDER BY s.created_at, s.id
            "#,
        )
        .bind(item_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(split_from_row)
        .collect();

        Ok(Some(item_from_row(row, splits)))
    }

    /// Sum of a member's split amounts over an inclusive purchase-date range.
    pub async fn member_total_between(
        &self,
        member_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, DbError> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(s.amount_cents)
            FROM receipt_item_splits s
            JOIN receipt_items ri ON ri.id = s.receipt_item_id
            JOIN receipts r ON r.id = ri.receipt_id
            WHERE s.member_id = ? AND r.purchase_date BETWEEN ? AND ?
            "#,
        )
        .bind(member_id)
        .bind(from)
        .bind(to)
        .fetch_one(self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }

    /// A member's split totals per purchase date over an inclusive range.
    /// Dates without spending are absent.
    pub async fn member_daily_totals(
        &self,
        member_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, DbError> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT r.purchase_date, SUM(s.amount_cents)
            FROM receipt_item_splits s
            JOIN receipt_items ri ON ri.id = s.receipt_item_id
            JOIN receipts r ON r.id = ri.receipt_id
            WHERE s.member_id = ? AND r.purchase_date BETWEEN ? AND ?
            GROUP BY r.purchase_date
            ORDER BY r.purchase_date
            "#,
        )
        .bind(member_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// A member's split totals per "YYYY-MM" month prefix over a range.
    /// Months without spending are absent.
    pub async fn member_monthly_totals(
        &self,
        member_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(String, i64)>, DbError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT substr(r.purchase_date, 1, 7), SUM(s.amount_cents)
            FROM receipt_item_splits s
            JOIN receipt_items ri ON ri.id = s.receipt_item_id
            JOIN receipts r ON r.id = ri.receipt_id
            WHERE s.member_id = ? AND r.purchase_date BETWEEN ? AND ?
            GROUP BY substr(r.purchase_date, 1, 7)
            ORDER BY substr(r.purchase_date, 1, 7)
            "#,
        )
        .bind(member_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// A member's split totals per category over a range. Categories with no
    /// spending are omitted.
    pub async fn member_category_totals(
        &self,
        member_id: &str,
        room_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(Category, i64)>, DbError> {
        let rows = sqlx::query_as::<_, (String, String, String, bool, i64, i64)>(
            r#"
            SELECT c.id, c.room_id, c.name, c.is_default, c.created_at, SUM(s.amount_cents)
            FROM categories c
            JOIN receipt_items ri ON ri.category_id = c.id
            JOIN receipt_item_splits s ON s.receipt_item_id = ri.id
            JOIN receipts r ON r.id = ri.receipt_id
            WHERE c.room_id = ? AND s.member_id = ? AND r.purchase_date BETWEEN ? AND ?
            GROUP BY c.id
            HAVING SUM(s.amount_cents) > 0
            ORDER BY c.created_at, c.name
            "#,
        )
        .bind(room_id)
        .bind(member_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, room_id, name, is_default, created_at, total)| {
                (
                    Category {
                        id,
                        room_id,
                        name,
                        is_default,
                        created_at,
                    },
                    total,
                )
            })
            .collect())
    }

    /// Per-member split totals for a room over a range, highest spender
    /// first. Members without spending appear with a zero total.
    pub async fn member_totals_for_room(
        &self,
        room_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(RoomMember, i64)>, DbError> {
        let rows = sqlx::query_as::<_, (String, String, String, String, String, i64, i64)>(
            r#"
            SELECT m.id, m.room_id, m.user_id, m.icon, m.name, m.joined_at,
                   COALESCE(SUM(CASE WHEN r.purchase_date BETWEEN ? AND ?
                                     THEN s.amount_cents ELSE 0 END), 0) AS total
            FROM room_members m
            LEFT JOIN receipt_item_splits s ON s.member_id = m.id
            LEFT JOIN receipt_items ri ON ri.id = s.receipt_item_id
            LEFT JOIN receipts r ON r.id = ri.receipt_id
            WHERE m.room_id = ?
            GROUP BY m.id
            ORDER BY total DESC, m.joined_at
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(room_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, room_id, user_id, icon, name, joined_at, total)| {
                (
                    RoomMember {
                        id,
                        room_id,
                        user_id,
                        icon,
                        name,
                        joined_at,
                    },
                    total,
                )
            })
            .collect())
    }

    /// One page of purchase history plus the pre-pagination count and the
    /// total spent under the same filters.
    ///
    /// With `member_id` set, rows are the member's splits; without it, every
    /// receipt item of the room. `search` matches item name, general name,
    /// and receipt name as a substring.
    #[allow(clippy::too_many_arguments)]
    pub async fn history_page(
        &self,
        room_id: &str,
        member_id: Option<&str>,
        search: Option<&str>,
        category_id: Option<&str>,
        sort: HistorySort,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<HistoryRow>, i64, i64), DbError> {
        let (select_cols, from_sql, spent_expr, tiebreak) = if member_id.is_some() {
            (
                "SELECT s.id, s.amount_cents, ri.name, ri.general_name, ri.quantity, \
                 ri.price_cents, ri.actual_price_cents, \
                 c.id, c.room_id, c.name, c.is_default, c.created_at, \
                 r.name, r.purchase_date",
                " FROM receipt_item_splits s \
                 JOIN receipt_items ri ON ri.id = s.receipt_item_id \
                 JOIN receipts r ON r.id = ri.receipt_id \
                 LEFT JOIN categories c ON c.id = ri.category_id",
                "COALESCE(SUM(s.amount_cents), 0)",
                "s.id",
            )
        } else {
            (
                "SELECT ri.id, NULL, ri.name, ri.general_name, ri.quantity, \
                 ri.price_cents, ri.actual_price_cents, \
                 c.id, c.room_id, c.name, c.is_default, c.created_at, \
                 r.name, r.purchase_date",
                " FROM receipt_items ri \
                 JOIN receipts r ON r.id = ri.receipt_id \
                 LEFT JOIN categories c ON c.id = ri.category_id",
                "COALESCE(SUM(ri.actual_price_cents), 0)",
                "ri.id",
            )
        };

        let mut where_sql = String::from(" WHERE r.room_id = ?");
        let mut binds: Vec<String> = vec![room_id.to_string()];

        if let Some(member_id) = member_id {
            where_sql.push_str(" AND s.member_id = ?");
            binds.push(member_id.to_string());
        }
        if let Some(search) = search {
            where_sql.push_str(" AND (ri.name LIKE ? OR ri.general_name LIKE ? OR r.name LIKE ?)");
            let pattern = format!("%{search}%");
            binds.push(pattern.clone());
            binds.push(pattern.clone());
            binds.push(pattern);
        }
        if let Some(category_id) = category_id {
            where_sql.push_str(" AND ri.category_id = ?");
            binds.push(category_id.to_string());
        }

        let count_sql = format!("SELECT COUNT(*){from_sql}{where_sql}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind);
        }
        let total_items = count_query.fetch_one(self.pool).await?;

        let spent_sql = format!("SELECT {spent_expr}{from_sql}{where_sql}");
        let mut spent_query = sqlx::query_scalar::<_, i64>(&spent_sql);
        for bind in &binds {
            spent_query = spent_query.bind(bind);
        }
        let total_spent = spent_query.fetch_one(self.pool).await?;

        let rows_sql = format!(
            "{select_cols}{from_sql}{where_sql} ORDER BY {} {}, {tiebreak} LIMIT ? OFFSET ?",
            sort.sql_column(),
            order.sql_keyword(),
        );
        let mut rows_query = sqlx::query_as::<_, HistoryTuple>(&rows_sql);
        for bind in &binds {
            rows_query = rows_query.bind(bind);
        }
        let rows = rows_query
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        let rows = rows
            .into_iter()
            .map(
                |(
                    id,
                    amount_cents,
                    name,
                    general_name,
                    quantity,
                    price_cents,
                    actual_price_cents,
                    cat_id,
                    cat_room_id,
                    cat_name,
                    cat_is_default,
                    cat_created_at,
                    receipt_name,
                    purchase_date,
                )| {
                    let category =
                        match (cat_id, cat_room_id, cat_name, cat_is_default, cat_created_at) {
                            (
                                Some(id),
                                Some(room_id),
                                Some(name),
                                Some(is_default),
                                Some(created_at),
                            ) => Some(Category {
                                id,
                                room_id,
                                name,
                                is_default,
                                created_at,
                            }),
                            _ => None,
                        };
                    HistoryRow {
                        id,
                        amount_cents,
                        name,
                        general_name,
                        quantity,
                        price_cents,
                        actual_price_cents,
                        category,
                        receipt_name,
                        purchase_date,
                    }
                },
            )
            .collect();

        Ok((rows, total_items, total_spent))
    }

    /// A member's individual splits over a range, chronological. Each row is
    /// (split id, amount, receipt item id, receipt name, purchase date).
    pub async fn member_expense_rows(
        &self,
        member_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(String, i64, String, String, NaiveDate)>, DbError> {
        let rows = sqlx::query_as::<_, (String, i64, String, String, NaiveDate)>(
            r#"
            SELECT s.id, s.amount_cents, s.receipt_item_id, r.name, r.purchase_date
            FROM receipt_item_splits s
            JOIN receipt_items ri ON ri.id = s.receipt_item_id
            JOIN receipts r ON r.id = ri.receipt_id
            WHERE s.member_id = ? AND r.purchase_date BETWEEN ? AND ?
            ORDER BY r.purchase_date, s.created_at, s.id
            "#,
        )
        .bind(member_id)
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
