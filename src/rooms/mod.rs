//! Room Domain Module
//!
//! Rooms are the shared spaces everything else hangs off: memberships,
//! shopping lists, categories, receipts, and debts. This module covers
//! room creation, invite-code joins, membership listing, and withdrawal.

pub mod handlers;
pub mod helpers;
pub mod models;

pub use handlers::routes;
