//! # Taskboard Shared Library
//!
//! Domain types, persistence and business rules behind the Taskboard API.
//!
//! ## Module Organization
//!
//! - `models`: tasks, users, inputs, filters and stats
//! - `validation`: input normalization and field rules
//! - `store`: persistence traits with PostgreSQL and in-memory implementations
//! - `repository`: task and user operations (ownership, timestamps, change events)
//! - `events`: in-process change feed and live task subscriptions
//! - `auth`: session token verification and request context
//! - `db`: connection pool and migrations
//! - `clock`: injectable time source
//! - `error`: repository error taxonomy

pub mod auth;
pub mod clock;
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod repository;
pub mod store;
pub mod validation;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
