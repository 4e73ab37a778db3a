//! Error types for the price-timeline system.

use crate::types::Timestamp;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the price-timeline system.
#[derive(Error, Debug)]
pub enum Error {
    /// A period whose begin does not strictly precede its end.
    #[error("Invalid period: begin {begin} is not before end {end}")]
    InvalidPeriod { begin: Timestamp, end: Timestamp },

    /// Record validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid period error.
    pub fn invalid_period(begin: Timestamp, end: Timestamp) -> Self {
        Error::InvalidPeriod { begin, end }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
