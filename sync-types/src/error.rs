//! Error types for offsync.

use thiserror::Error;

/// Errors that can occur when building or decoding offsync data.
#[derive(Debug, Error)]
pub enum SyncError {
    /// JSON serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// JSON deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// URL could not be parsed
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid data format
    #[error("invalid data: {0}")]
    InvalidData(String),
}
