//! Core error types for isuride.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use crate::rides::RideStatus;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the dispatch core.
///
/// Empty outcomes (no unassigned ride, no eligible chair, unknown topic) are
/// never errors; they are reported through the result types of each service.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Ride {ride_id} cannot move from {from} to {to}")]
    InvalidTransition {
        ride_id: String,
        from: RideStatus,
        to: RideStatus,
    },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Whether the failure is transient from the caller's point of view.
    ///
    /// The dispatch matcher never retries on its own; the trigger that invoked
    /// it uses this to decide whether another pass is worth attempting.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Database(db) => matches!(
                db,
                DatabaseError::ConnectionFailed(_)
                    | DatabaseError::PoolCreationFailed(_)
                    | DatabaseError::QueryFailed(_)
                    | DatabaseError::TransactionFailed(_)
                    | DatabaseError::Unavailable(_)
            ),
            _ => false,
        }
    }

    /// Whether the failure means a requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::NotFound(_)))
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A foreign key constraint was violated.
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// The store is shut down or otherwise not accepting work.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failures_are_retryable() {
        let err = Error::Database(DatabaseError::ConnectionFailed("refused".to_string()));
        assert!(err.is_retryable());

        let err = Error::Database(DatabaseError::Unavailable("writer stopped".to_string()));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_domain_failures_are_not_retryable() {
        let err = Error::InvalidConfigValue("speed".to_string());
        assert!(!err.is_retryable());

        let err = Error::Database(DatabaseError::NotFound("ride".to_string()));
        assert!(!err.is_retryable());
        assert!(err.is_not_found());
    }
}
