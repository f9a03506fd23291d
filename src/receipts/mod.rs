//! Receipt Domain Module
//!
//! A receipt is a purchase record with line items. Each line item is split
//! between room members, either evenly or assigned to one member, and every
//! split that crosses members is folded into the room's netted debts.
//!
//! All money moves in integer cents. Uneven even-splits round half-up per
//! share, matching how the amounts are presented to members.

pub mod handlers;
pub mod helpers;
pub mod models;

pub use handlers::routes;
