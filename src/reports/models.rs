//! Reporting response models and query-parameter types.

use crate::categories::models::Category;
use crate::receipts::models::ReceiptItem;
use crate::rooms::models::RoomMember;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A member's expense total over some date range.
#[derive(Debug, Serialize)]
pub struct MemberExpense {
    pub member: RoomMember,
    pub total_expense_cents: i64,
}

/// Spending on a single day.
#[derive(Debug, Serialize)]
pub struct DailyExpense {
    pub date: NaiveDate,
    pub total_cents: i64,
}

/// Spending in a single calendar month.
#[derive(Debug, Serialize)]
pub struct MonthlyExpense {
    pub year: i32,
    pub month: u32,
    pub total_cents: i64,
}

/// Spending within a single category.
#[derive(Debug, Serialize)]
pub struct CategoryExpense {
    pub category: Category,
    pub total_cents: i64,
}

/// One split with its receipt item context, for the itemized listings.
#[derive(Debug, Serialize)]
pub struct ExpenseDetail {
    pub id: String,
    pub receipt_item: ReceiptItem,
    pub amount_cents: i64,
    pub receipt_name: String,
    pub purchase_date: NaiveDate,
}

/// Optional `year`/`month` query parameters, raw. Kept as strings so
/// garbage values produce the reporting error message, not a deserializer
/// rejection.
#[derive(Debug, Default, Deserialize)]
pub struct YearMonthQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

/// Optional `year`/`month`/`day` query parameters, raw.
#[derive(Debug, Default, Deserialize)]
pub struct YearMonthDayQuery {
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
}
