//! Receipt domain models.

use crate::categories::models::Category;
use crate::rooms::models::RoomMember;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A committed receipt with its line items embedded.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub id: String,
    pub room_id: String,
    pub name: String,
    pub total_amount_cents: i64,
    pub subtotal_cents: i64,
    pub tax_amount_cents: i64,
    pub tax_rate: f64,
    pub discount_amount_cents: i64,
    pub discount_rate: f64,
    pub purchase_date: NaiveDate,
    pub uploaded_by: String,
    pub error: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub items: Vec<ReceiptItem>,
}

/// A line item of a receipt, with its splits embedded.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptItem {
    pub id: String,
    pub receipt_id: String,
    pub category: Option<Category>,
    pub name: String,
    pub general_name: String,
    pub quantity: f64,
    pub price_cents: i64,
    pub actual_price_cents: i64,
    pub added_at: i64,
    pub splits: Vec<ReceiptSplit>,
}

/// One member's share of a line item.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptSplit {
    pub id: String,
    pub receipt_item_id: String,
    pub member: RoomMember,
    pub amount_cents: i64,
    pub paid_by: Option<RoomMember>,
    pub created_at: i64,
}

/// How a line item's cost is divided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSpec {
    /// Every current member pays an equal share.
    Evenly,
    /// One member carries the whole amount.
    ByUser { member_id: String },
}

/// A validated receipt ready for storage.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub name: String,
    pub total_amount_cents: i64,
    pub subtotal_cents: i64,
    pub tax_amount_cents: i64,
    pub tax_rate: f64,
    pub discount_amount_cents: i64,
    pub discount_rate: f64,
    pub purchase_date: NaiveDate,
    pub error: Option<String>,
    pub items: Vec<NewReceiptItem>,
}

/// A validated line item ready for storage.
#[derive(Debug, Clone)]
pub struct NewReceiptItem {
    pub name: String,
    pub general_name: String,
    pub quantity: f64,
    pub price_cents: i64,
    pub actual_price_cents: i64,
    pub category: String,
    pub paid_by_id: String,
    pub split: SplitSpec,
}

/// Raw receipt payload as submitted by the client. Field presence is
/// checked by the validator so missing-field errors carry the field name.
#[derive(Debug, Deserialize)]
pub struct ReceiptPayload {
    pub name: Option<String>,
    pub total_amount_cents: Option<i64>,
    pub subtotal_cents: Option<i64>,
    pub tax_amount_cents: Option<i64>,
    pub tax_rate: Option<f64>,
    pub discount_amount_cents: Option<i64>,
    pub discount_rate: Option<f64>,
    pub purchase_date: Option<String>,
    pub error: Option<String>,
    pub items: Option<Vec<ReceiptItemPayload>>,
}

/// Raw line item payload as submitted by the client.
#[derive(Debug, Deserialize)]
pub struct ReceiptItemPayload {
    pub name: Option<String>,
    pub general_name: Option<String>,
    pub quantity: Option<f64>,
    pub price_cents: Option<i64>,
    pub actual_price_cents: Option<i64>,
    pub category: Option<String>,
    pub split_method: Option<String>,
    pub split_user_id: Option<String>,
    pub paid_by_id: Option<String>,
}
