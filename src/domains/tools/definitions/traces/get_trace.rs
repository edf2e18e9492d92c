//! Single trace lookup tool definition.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::client::TempoClient;
use super::common::{is_trace_id, pretty_json};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, parse_params};

/// Parameters for the trace lookup tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTraceParams {
    /// Hexadecimal trace ID.
    #[schemars(description = "ID of the trace to fetch (hexadecimal)")]
    pub trace_id: String,
}

/// Trace lookup tool - fetches one trace by its ID.
pub struct GetTraceTool {
    client: Arc<TempoClient>,
}

impl GetTraceTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_trace";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Fetch a single trace from Grafana Tempo by its trace ID, including all of its spans.";

    pub fn new(client: Arc<TempoClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, trace_id: &str) -> Result<String, ToolError> {
        if !is_trace_id(trace_id) {
            return Err(ToolError::invalid_arguments(format!(
                "Invalid trace ID '{}': expected a hexadecimal string",
                trace_id
            )));
        }

        info!("Fetching trace {}", trace_id);
        let body = self.client.get_json(&self.client.trace_url(trace_id)).await?;
        Ok(pretty_json(&body))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetTraceParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for GetTraceTool {
    fn tool(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> ToolResult {
        let params: GetTraceParams = match parse_params(arguments) {
            Ok(params) => params,
            Err(e) => return e.into(),
        };
        self.fetch(params.trace_id.trim()).await.into()
    }
}
