//! Debt presentation helpers.

use super::models::Debt;

/// Flag the debts the given member is a party to.
pub fn mark_related(debts: &mut [Debt], member_id: &str) {
    for debt in debts.iter_mut() {
        debt.related_to_me = debt.debtor.id == member_id || debt.creditor.id == member_id;
    }
}

/// Order debts for display: the acting member's own first, then by amount
/// descending.
pub fn sort_debts(debts: &mut [Debt]) {
    debts.sort_by(|a, b| {
        b.related_to_me
            .cmp(&a.related_to_me)
            .then(b.amount_cents.cmp(&a.amount_cents))
    });
}
