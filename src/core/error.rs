//! Error types and handling for the MCP server.
//!
//! Server construction can only fail while building the tool registry.
//! Transport failures are reported through
//! [`TransportError`](super::transport::TransportError), and per-call tool
//! failures never leave the server as errors: they become error envelopes.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::ToolError;

    #[test]
    fn test_tool_error_wrapped() {
        let err = Error::from(ToolError::Duplicate("get_trace".into()));
        assert_eq!(err.to_string(), "Tool error: Tool already registered: get_trace");
    }
}
