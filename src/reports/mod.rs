//! Reporting Domain Module
//!
//! Read-only aggregation over splits: per-member monthly totals, the
//! dashboard composite, per-day calendars, and itemized expense listings.
//! An expense always means the sum of split amounts whose receipt falls in
//! the requested purchase-date range.

pub mod handlers;
pub mod helpers;
pub mod models;

pub use handlers::routes;
