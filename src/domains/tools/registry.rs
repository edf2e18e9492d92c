//! Tool Registry - ordered registration and name lookup for all tools.
//!
//! The registry is built once at startup and shared read-only. It never runs
//! a handler itself; the server resolves a name, validates the arguments
//! against the stored [`Schema`] and then calls the handler.

use std::sync::Arc;

use rmcp::model::Tool;
use tracing::{debug, warn};

use crate::core::config::Config;

use super::definitions::traces::{
    GetTraceTool, GetTracesTool, QueryMetricsTool, SearchTracesTool, TempoClient,
};
use super::error::ToolError;
use super::handlers::ToolHandler;
use super::schema::Schema;

/// A registered tool: descriptor, validation schema and handler.
pub struct RegisteredTool {
    tool: Tool,
    schema: Schema,
    handler: Arc<dyn ToolHandler>,
}

impl RegisteredTool {
    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }
}

/// Tool registry - manages all available tools in registration order.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry with every Tempo tool, sharing one backend client.
    pub fn from_config(config: &Config) -> Result<Self, ToolError> {
        let client = Arc::new(TempoClient::from_config(&config.tempo)?);

        let mut registry = Self::new();
        registry.register(GetTracesTool::new(client.clone()))?;
        registry.register(GetTraceTool::new(client.clone()))?;
        registry.register(SearchTracesTool::new(client.clone()))?;
        registry.register(QueryMetricsTool::new(client))?;
        Ok(registry)
    }

    /// Register a handler under the name its descriptor declares.
    pub fn register<H>(&mut self, handler: H) -> Result<(), ToolError>
    where
        H: ToolHandler + 'static,
    {
        let tool = handler.tool();
        if self.entries.iter().any(|e| e.tool.name == tool.name) {
            warn!("Duplicate tool registration: {}", tool.name);
            return Err(ToolError::Duplicate(tool.name.to_string()));
        }

        debug!("Registering tool: {}", tool.name);
        let schema = Schema::from_json_schema(&tool.input_schema);
        self.entries.push(RegisteredTool {
            tool,
            schema,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// All tool descriptors, in registration order.
    pub fn list(&self) -> Vec<Tool> {
        self.entries.iter().map(|e| e.tool.clone()).collect()
    }

    /// Get all tool names, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.tool.name.as_ref()).collect()
    }

    /// Look up a tool by exact, case-sensitive name.
    pub fn resolve(&self, name: &str) -> Result<&RegisteredTool, ToolError> {
        self.entries
            .iter()
            .find(|e| e.tool.name == name)
            .ok_or_else(|| ToolError::not_found(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
