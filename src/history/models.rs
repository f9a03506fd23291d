//! History domain models and query-parameter types.

use crate::categories::models::Category;
use crate::db::HistoryRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which rows the history listing is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryView {
    /// The acting member's splits.
    MyItems,
    /// Every receipt item of the room.
    RoomItems,
}

impl HistoryView {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "my_items" => Ok(Self::MyItems),
            "room_items" => Ok(Self::RoomItems),
            _ => Err("Invalid view parameter. Must be 'my_items' or 'room_items'.".to_string()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MyItems => "my_items",
            Self::RoomItems => "room_items",
        }
    }
}

/// Sort key for history rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySort {
    PurchaseDate,
    Price,
    Quantity,
}

impl HistorySort {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "purchase_date" => Ok(Self::PurchaseDate),
            "price" => Ok(Self::Price),
            "quantity" => Ok(Self::Quantity),
            _ => Err(
                "Invalid sort_by parameter. Must be 'purchase_date', 'price', or 'quantity'."
                    .to_string(),
            ),
        }
    }

    /// Column the SQL ORDER BY uses. The aliases hold under both views'
    /// FROM clauses.
    pub fn sql_column(self) -> &'static str {
        match self {
            Self::PurchaseDate => "r.purchase_date",
            Self::Price => "ri.price_cents",
            Self::Quantity => "ri.quantity",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PurchaseDate => "purchase_date",
            Self::Price => "price",
            Self::Quantity => "quantity",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err("Invalid sort_order parameter. Must be 'asc' or 'desc'.".to_string()),
        }
    }

    pub fn sql_keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Raw query parameters as they arrive. Everything is optional; the
/// validator applies defaults and produces the specific error messages.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub view: Option<String>,
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Validated history parameters.
#[derive(Debug, Clone)]
pub struct HistoryParams {
    pub view: HistoryView,
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub sort_by: HistorySort,
    pub sort_order: SortOrder,
    pub page: i64,
    pub page_size: i64,
}

/// One row of the history listing as serialized to clients.
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: String,
    /// The acting member's split amount. Absent in the `room_items` view.
    #[serde(skip_serializing_if = "Option::is_none")]
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

impl From<HistoryRow> for HistoryItem {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            amount_cents: row.amount_cents,
            name: row.name,
            general_name: row.general_name,
            quantity: row.quantity,
            price_cents: row.price_cents,
            actual_price_cents: row.actual_price_cents,
            category: row.category,
            receipt_name: row.receipt_name,
            purchase_date: row.purchase_date,
        }
    }
}

/// Pagination metadata returned with every history page.
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current_page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
}
