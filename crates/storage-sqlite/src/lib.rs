//! SQLite storage implementation for isuride.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `isuride-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations (including the chair model seed data)
//! - Repository implementations for chairs, rides, matching and distances
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```
//!
//! All writes go through a single writer actor (`db::spawn_writer`); reads use
//! pooled connections.

pub mod db;
pub mod errors;
pub mod schema;

mod queries;

// Repository implementations
pub mod chairs;
pub mod distance;
pub mod matching;
pub mod rides;

#[cfg(test)]
mod repository_tests;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool, WriteHandle};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from isuride-core for convenience
pub use isuride_core::errors::{DatabaseError, Error, Result};
