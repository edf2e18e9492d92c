//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that end a transport loop.
///
/// Malformed messages are not errors at this level: they are answered or
/// dropped and the loop keeps reading.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading from or writing to the stream failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A response could not be serialized.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
