//! Trace window tool definition.
//!
//! Fetches the spans a service produced within a time window. The window
//! bounds are forwarded to Tempo exactly as the caller wrote them.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, instrument};

use super::client::TempoClient;
use super::common::pretty_json;
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, parse_params};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the trace window tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetTracesParams {
    /// Name of the service whose traces are fetched.
    #[schemars(description = "Service name to fetch traces for")]
    pub service_name: String,

    /// Start of the window.
    #[schemars(description = "Start time (ISO 8601)")]
    pub start_time: String,

    /// End of the window.
    #[schemars(description = "End time (ISO 8601)")]
    pub end_time: String,
}

/// Query derived from validated parameters.
///
/// Values are passed through uninterpreted; Tempo decides whether it
/// understands the time representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceQuery {
    pub service_name: String,
    pub start_time: String,
    pub end_time: String,
}

impl TraceQuery {
    /// Query string pairs in the order Tempo documents them.
    pub fn query_pairs(&self) -> [(&str, &str); 3] {
        [
            ("service", self.service_name.as_str()),
            ("start", self.start_time.as_str()),
            ("end", self.end_time.as_str()),
        ]
    }
}

impl From<GetTracesParams> for TraceQuery {
    fn from(params: GetTracesParams) -> Self {
        Self {
            service_name: params.service_name,
            start_time: params.start_time,
            end_time: params.end_time,
        }
    }
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Trace window tool - fetches traces for a service between two timestamps.
pub struct GetTracesTool {
    client: Arc<TempoClient>,
}

impl GetTracesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "get_traces";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Fetch trace data from Grafana Tempo for a service within a time window. Returns the backend's JSON response.";

    pub fn new(client: Arc<TempoClient>) -> Self {
        Self { client }
    }

    /// Run the query against Tempo.
    #[instrument(skip_all, fields(service = %query.service_name))]
    pub async fn fetch(&self, query: &TraceQuery) -> Result<String, ToolError> {
        info!(
            "Fetching traces for {} between {} and {}",
            query.service_name, query.start_time, query.end_time
        );

        let url = self.client.traces_url(&query.query_pairs())?;
        let body = self.client.get_json(&url).await?;
        Ok(pretty_json(&body))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<GetTracesParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for GetTracesTool {
    fn tool(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> ToolResult {
        let params: GetTracesParams = match parse_params(arguments) {
            Ok(params) => params,
            Err(e) => return e.into(),
        };
        self.fetch(&TraceQuery::from(params)).await.into()
    }
}
