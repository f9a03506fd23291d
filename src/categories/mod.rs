//! Category Domain Module
//!
//! Expense categories are scoped to a room. Every room starts with a fixed
//! set of defaults; members can add their own and rename the ones they
//! added, but the defaults are immutable.

pub mod handlers;
pub mod models;

pub use handlers::routes;

/// Categories seeded into every new room.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Food Groceries",
    "Household Product",
    "Dining and Takeout",
    "Personal Entertainment",
    "Miscellaneous",
    "Others",
];
