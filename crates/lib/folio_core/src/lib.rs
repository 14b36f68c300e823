//! # folio_core
//!
//! Core domain logic for Folio: access-token codec, refresh sessions and users.

pub mod auth;
pub mod migrate;
pub mod models;
pub mod users;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
