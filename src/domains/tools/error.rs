//! Tool-specific error types.

use thiserror::Error;

use super::definitions::traces::BackendError;
use super::schema::ValidationOutcome;

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Unknown tool")]
    NotFound(String),

    /// A tool with the same name is already registered.
    #[error("Tool already registered: {0}")]
    Duplicate(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tracing backend could not answer the query.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}

impl From<ValidationOutcome> for ToolError {
    fn from(outcome: ValidationOutcome) -> Self {
        Self::InvalidArguments(outcome.to_string())
    }
}
