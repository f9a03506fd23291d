//! Receipt validation and split arithmetic.

use super::models::{NewReceipt, NewReceiptItem, ReceiptPayload, SplitSpec};
use chrono::NaiveDate;

/// Integer division rounded half-up. Shares of an even split are each
/// `round_half_up(amount / n)`, so 1000 / 3 gives three shares of 333.
pub fn round_half_up_div(amount_cents: i64, n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    (2 * amount_cents + n) / (2 * n)
}

/// Validate a raw receipt payload into its storable form.
///
/// The error string is returned to the client verbatim as a 400.
pub fn validate_receipt(payload: ReceiptPayload) -> Result<NewReceipt, String> {
    let name = payload
        .name
        .ok_or_else(|| "Missing required field: name".to_string())?;
    let total_amount_cents = payload
        .total_amount_cents
        .ok_or_else(|| "Missing required field: total_amount_cents".to_string())?;
    let subtotal_cents = payload
        .subtotal_cents
        .ok_or_else(|| "Missing required field: subtotal_cents".to_string())?;
    let tax_amount_cents = payload
        .tax_amount_cents
        .ok_or_else(|| "Missing required field: tax_amount_cents".to_string())?;
    let tax_rate = payload
        .tax_rate
        .ok_or_else(|| "Missing required field: tax_rate".to_string())?;
    let discount_amount_cents = payload
        .discount_amount_cents
        .ok_or_else(|| "Missing required field: discount_amount_cents".to_string())?;
    let discount_rate = payload
        .discount_rate
        .ok_or_else(|| "Missing required field: discount_rate".to_string())?;
    let purchase_date = payload
        .purchase_date
        .ok_or_else(|| "Missing required field: purchase_date".to_string())?;

    let purchase_date = NaiveDate::parse_from_str(&purchase_date, "%Y-%m-%d")
        .map_err(|_| "Invalid purchase_date format. Expected YYYY-MM-DD.".to_string())?;

    let raw_items = payload.items.unwrap_or_default();
    if raw_items.is_empty() {
        return Err("Receipt must contain at least one item.".to_string());
    }

    let mut items = Vec::with_capacity(raw_items.len());
    for item in raw_items {
        let item_name = item
            .name
            .ok_or_else(|| "Each item must have a name.".to_string())?;
        let price_cents = item
            .price_cents
            .ok_or_else(|| "Each item must have a price_cents.".to_string())?;
        let category = item
            .category
            .ok_or_else(|| "Each item must have a category.".to_string())?;

        let split_method = item
            .split_method
            .ok_or_else(|| "Each item must have a split_method.".to_string())?;
        let split = match split_method.as_str() {
            "EVENLY" => SplitSpec::Evenly,
            "BY_USER" => {
                let member_id = item.split_user_id.ok_or_else(|| {
                    "split_user_id is required for BY_USER split method.".to_string()
                })?;
                SplitSpec::ByUser { member_id }
            }
            other => return Err(format!("Invalid split_method: {other}")),
        };

        let paid_by_id = item
            .paid_by_id
            .ok_or_else(|| "paid_by_id is required for each item.".to_string())?;

        items.push(NewReceiptItem {
            general_name: item.general_name.unwrap_or_else(|| item_name.clone()),
            name: item_name,
            quantity: item.quantity.unwrap_or(1.0),
            actual_price_cents: item.actual_price_cents.unwrap_or(price_cents),
            price_cents,
            category,
            paid_by_id,
            split,
        });
    }

    Ok(NewReceipt {
        name,
        total_amount_cents,
        subtotal_cents,
        tax_amount_cents,
        tax_rate,
        discount_amount_cents,
        discount_rate,
        purchase_date,
        error: payload.error,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::super::models::ReceiptItemPayload;
    use super::*;

    fn base_payload() -> ReceiptPayload {
        ReceiptPayload {
            name: Some("Weekly shop".to_string()),
            total_amount_cents: Some(5400),
            subtotal_cents: Some(5000),
            tax_amount_cents: Some(400),
            tax_rate: Some(8.0),
            discount_amount_cents: Some(0),
            discount_rate: Some(0.0),
            purchase_date: Some("2025-04-12".to_string()),
            error: None,
            items: Some(vec![ReceiptItemPayload {
                name: Some("Milk".to_string()),
                general_name: None,
                quantity: None,
                price_cents: Some(500),
                actual_price_cents: None,
                category: Some("Food Groceries".to_string()),
                split_method: Some("EVENLY".to_string()),
                split_user_id: None,
                paid_by_id: Some("member-1".to_string()),
            }]),
        }
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_half_up_div(1000, 3), 333);
        assert_eq!(round_half_up_div(1001, 3), 334);
        assert_eq!(round_half_up_div(1000, 4), 250);
        assert_eq!(round_half_up_div(5, 2), 3);
        assert_eq!(round_half_up_div(0, 3), 0);
        assert_eq!(round_half_up_div(100, 0), 0);
    }

    #[test]
    fn accepts_valid_payload_with_defaults() {
        let receipt = validate_receipt(base_payload()).unwrap();
        assert_eq!(receipt.items.len(), 1);
        let item = &receipt.items[0];
        assert_eq!(item.general_name, "Milk");
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.actual_price_cents, 500);
        assert_eq!(item.split, SplitSpec::Evenly);
    }

    #[test]
    fn reports_missing_receipt_field() {
        let mut payload = base_payload();
        payload.tax_rate = None;
        let err = validate_receipt(payload).unwrap_err();
        assert_eq!(err, "Missing required field: tax_rate");
    }

    #[test]
    fn rejects_bad_purchase_date() {
        let mut payload = base_payload();
        payload.purchase_date = Some("12/04/2025".to_string());
        let err = validate_receipt(payload).unwrap_err();
        assert!(err.starts_with("Invalid purchase_date format"));
    }

    #[test]
    fn rejects_empty_items() {
        let mut payload = base_payload();
        payload.items = Some(vec![]);
        let err = validate_receipt(payload).unwrap_err();
        assert_eq!(err, "Receipt must contain at least one item.");
    }

    #[test]
    fn rejects_unknown_split_method() {
        let mut payload = base_payload();
        payload.items.as_mut().unwrap()[0].split_method = Some("HALF".to_string());
        let err = validate_receipt(payload).unwrap_err();
        assert_eq!(err, "Invalid split_method: HALF");
    }

    #[test]
    fn by_user_requires_split_user_id() {
        let mut payload = base_payload();
        payload.items.as_mut().unwrap()[0].split_method = Some("BY_USER".to_string());
        let err = validate_receipt(payload).unwrap_err();
        assert_eq!(err, "split_user_id is required for BY_USER split method.");
    }

    #[test]
    fn every_item_requires_paid_by() {
        let mut payload = base_payload();
        payload.items.as_mut().unwrap()[0].paid_by_id = None;
        let err = validate_receipt(payload).unwrap_err();
        assert_eq!(err, "paid_by_id is required for each item.");
    }
}
