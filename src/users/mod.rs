//! User Domain Module
//!
//! Users are the identities behind room memberships. There is no password
//! or session machinery here; requests name their acting user through the
//! `X-User-Id` header.

pub mod handlers;
pub mod models;

pub use handlers::routes;
