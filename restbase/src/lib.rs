//! Minimal client for a PostgREST-style backend-as-a-service.
//!
//! Covers what the dashboard needs from the remote store: filtered selects
//! with embedded relations, insert, update-by-id, delete-by-id, and the
//! password-grant auth endpoints.

mod auth;
mod client;
mod query;
mod restbase_url;

pub(crate) use restbase_url::*;

pub use auth::*;
pub use client::*;
pub use query::*;
