//! Purchase History Domain Module
//!
//! A filtered, sorted, paginated listing over everything a room has bought:
//! either the acting member's own splits (`my_items`) or every receipt item
//! of the room (`room_items`). Filtering and sorting happen in SQL; this
//! module validates the query surface and shapes the page.

pub mod handlers;
pub mod helpers;
pub mod models;

pub use handlers::routes;
