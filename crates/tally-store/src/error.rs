//! Error types for the store module.

use thiserror::Error;

use tally_core::CoreError;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record (usually a vote target) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A vote record already exists for the same (voter, target) key.
    #[error("duplicate vote for {key}")]
    Conflict { key: String },

    /// A remote call failed or timed out. The outcome of the attempted
    /// operation is unknown.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for StoreError {
    fn from(e: CoreError) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
