//! Debt Domain Module
//!
//! Between any two members of a room there is at most one debt row, the net
//! of every split that crossed them. The netting itself lives with the
//! receipt commit; this module lists debts and settles them.

pub mod handlers;
pub mod helpers;
pub mod models;

pub use handlers::routes;
