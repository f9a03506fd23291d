//! Shopping List Domain Module
//!
//! Rooms hold ordered shopping lists; lists hold ordered grocery items.
//! Positions are dense indexes maintained on insert and reorder, and the
//! display order is always (position, creation time).

pub mod handlers;
pub mod models;

pub use handlers::routes;
