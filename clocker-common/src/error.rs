//! Common error types for clocker

use thiserror::Error;

use crate::time_log::TimeLogError;

/// Common result type for clocker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the clocker crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested calendar entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Calendar entry already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Time log validation or editing failure
    #[error(transparent)]
    TimeLog(#[from] TimeLogError),

    /// Stored data that cannot be mapped back to the domain model
    #[error("Internal error: {0}")]
    Internal(String),
}
