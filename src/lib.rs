//! Grocery Share backend
//!
//! A REST service for shared grocery management: users form rooms via
//! invite codes, keep ordered shopping lists, file receipts whose line
//! items are split between members, and settle the resulting debts.

// Domain modules
pub mod categories;
pub mod debts;
pub mod history;
pub mod lists;
pub mod receipts;
pub mod reports;
pub mod rooms;
pub mod users;

// Infrastructure
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod router;
pub mod state;
