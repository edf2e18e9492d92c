//! Tools domain module.
//!
//! This module handles all tool-related functionality for the MCP server.
//! Tools are executable functions that can be called by MCP clients.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `registry.rs` - Ordered tool registry and name lookup
//! - `schema.rs` - Argument validation against a tool's input schema
//! - `handlers.rs` - The `ToolHandler` trait and `ToolResult` envelope
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with a params struct deriving
//!    `JsonSchema`, a `to_tool()` descriptor and a `ToolHandler` impl
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it in `ToolRegistry::from_config`

pub mod definitions;
mod error;
mod handlers;
mod registry;
pub mod schema;

pub use error::ToolError;
pub use handlers::{ToolHandler, ToolResult, parse_params};
pub use registry::{RegisteredTool, ToolRegistry};
pub use schema::{FieldKind, Schema, ValidationOutcome, validate};
