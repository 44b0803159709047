//! Error types for versioned store operations

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures a store backend can report.
///
/// The query gateway does not distinguish between these; every variant is
/// surfaced to clients with its display text verbatim.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("no version of {key} at or before {timestamp}")]
    NoVersionAt { key: String, timestamp: i64 },

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("invalid interval: {0} (must be positive)")]
    InvalidInterval(i64),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Opaque backend failure. The message is passed through untouched.
    #[error("{0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a new backend error
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend(message.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if the error means the requested data does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::KeyNotFound(_) | StoreError::NoVersionAt { .. }
        )
    }

    /// Get the error category for monitoring/metrics
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::KeyNotFound(_) => "key_not_found",
            StoreError::NoVersionAt { .. } => "no_version",
            StoreError::InvalidRange { .. } => "invalid_range",
            StoreError::InvalidInterval(_) => "invalid_interval",
            StoreError::Configuration(_) => "configuration",
            StoreError::Backend(_) => "backend",
            StoreError::Io(_) => "io",
            StoreError::Json(_) => "json",
        }
    }
}
