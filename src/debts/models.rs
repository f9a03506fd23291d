//! Debt domain models.

use crate::rooms::models::RoomMember;
use serde::{Deserialize, Serialize};

/// A netted debt between two members of a room.
#[derive(Debug, Clone, Serialize)]
pub struct Debt {
    pub id: String,
    pub room_id: String,
    pub debtor: RoomMember,
    pub creditor: RoomMember,
    pub amount_cents: i64,
    pub last_updated: i64,
    /// Whether the acting member is the debtor or creditor. Filled in per
    /// request; stored rows carry `false`.
    pub related_to_me: bool,
}

/// Input for paying down a debt.
#[derive(Debug, Deserialize)]
pub struct PayDebtInput {
    pub amount_cents: i64,
}
