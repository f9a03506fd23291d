//! Application state shared across handlers.

use crate::db::Database;
use std::sync::Arc;

/// Shared application state that can be safely passed between threads.
pub type SharedState = Arc<AppState>;

/// Core application state.
pub struct AppState {
    /// Database handle. Cloning is cheap; it wraps a connection pool.
    pub db: Database,
}

impl AppState {
    /// Creates the application state around an open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
