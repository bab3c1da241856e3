//! Common error types for the matchback pipeline

use thiserror::Error;

/// Common result type for matchback operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the matchback crates
///
/// Only structural failures are errors. Per-record problems (unknown
/// tracking ids, missing optional fields) are reported through statistics.
#[derive(Error, Debug)]
pub enum Error {
    /// A sanitized record exposed a sensitive field. The whole batch is rejected.
    #[error("Privacy violation: field '{field}' found in sanitized record {record}")]
    PrivacyViolation { field: String, record: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input collection or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
