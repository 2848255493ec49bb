//! Error types for Tally Core.

use thiserror::Error;

/// Errors produced when decoding stored vote fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid target kind: {0:?}")]
    InvalidTargetKind(String),

    #[error("invalid polarity: {0:?}")]
    InvalidPolarity(String),
}
