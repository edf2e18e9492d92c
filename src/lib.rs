//! Tempo MCP Server Library
//!
//! A Model Context Protocol (MCP) server that exposes Grafana Tempo trace
//! queries as tools, spoken over newline-delimited JSON-RPC on stdin/stdout.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, request dispatch and the stdio transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **tools**: The tool registry, argument validation and the Tempo tools
//!
//! # Example
//!
//! ```rust,no_run
//! use tempo_mcp_server::core::{Config, McpServer, StdioTransport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     StdioTransport::run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
