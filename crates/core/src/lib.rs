//! isuride core - dispatch domain entities, services, and traits.
//!
//! This crate holds the dispatch matcher, the notification bus and the
//! distance-aggregation writer. It is database-agnostic and defines the
//! repository traits implemented by the `storage-sqlite` crate.

pub mod chairs;
pub mod constants;
pub mod distance;
pub mod errors;
pub mod geometry;
pub mod matching;
pub mod notifications;
pub mod rides;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
