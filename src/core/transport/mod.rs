//! Transport layer for the MCP server.
//!
//! MCP over standard input/output: newline-delimited JSON-RPC 2.0 messages.
//!
//! - `jsonrpc`: message types and parsing
//! - `stdio`: the read/dispatch/write loop
//!
//! The loop is generic over any buffered reader and writer, so the same code
//! serves the process's stdio and in-memory streams in tests.

mod error;
pub mod jsonrpc;
pub mod stdio;

pub use error::{TransportError, TransportResult};
pub use jsonrpc::{Incoming, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use stdio::{StdioTransport, serve};
