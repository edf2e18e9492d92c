//! TraceQL metrics tool definition.
//!
//! Runs a TraceQL metrics query (for example `{ } | rate()`) over a time
//! range and returns Tempo's time series as-is. Range bounds are passed
//! through untouched; Tempo accepts unix seconds, nanoseconds or RFC 3339.

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

/// Parameters for a TraceQL metrics query.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct QueryMetricsParams {
    #[schemars(description = "TraceQL metrics query, e.g. '{ resource.service.name = \"api\" } | rate()'")]
    pub q: String,

    #[serde(default)]
    #[schemars(description = "Range start (unix seconds or RFC 3339)")]
    pub start: Option<String>,

    #[serde(default)]
    #[schemars(description = "Range end (unix seconds or RFC 3339)")]
    pub end: Option<String>,

    #[serde(default)]
    #[schemars(description = "Relative range ending now, e.g. '1h'. Used when start/end are omitted.")]
    pub since: Option<String>,

    #[serde(default)]
    #[schemars(description = "Step between data points, e.g. '30s'")]
    pub step: Option<String>,

    #[serde(default)]
    #[schemars(description = "Maximum number of exemplars to return")]
    pub exemplars: Option<u32>,
}

impl QueryMetricsParams {
    /// Query string pairs in the order Tempo documents them. Empty values are
    /// left out.
    pub fn query_pairs(&self) -> Result<Vec<(&'static str, String)>, ToolError> {
        let q = self.q.trim();
        if q.is_empty() {
            return Err(ToolError::invalid_arguments("'q' must not be empty"));
        }

        let mut pairs = vec![("q", q.to_string())];
        let optional = [
            ("start", &self.start),
            ("end", &self.end),
            ("since", &self.since),
            ("step", &self.step),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        if let Some(exemplars) = self.exemplars.filter(|n| *n > 0) {
            pairs.push(("exemplars", exemplars.to_string()));
        }
        Ok(pairs)
    }
}

/// TraceQL metrics tool - time series computed from spans.
pub struct QueryMetricsTool {
    client: Arc<TempoClient>,
}

impl QueryMetricsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "query_metrics";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Run a TraceQL metrics query against Grafana Tempo (query_range) and return the resulting time series.";

    pub fn new(client: Arc<TempoClient>) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(q = %params.q))]
    pub async fn query(&self, params: &QueryMetricsParams) -> Result<String, ToolError> {
        let pairs = params.query_pairs()?;
        info!("Running TraceQL metrics query");

        let borrowed: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let url = self.client.metrics_url(&borrowed)?;
        let body = self.client.get_json(&url).await?;
        Ok(pretty_json(&body))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<QueryMetricsParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for QueryMetricsTool {
    fn tool(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> ToolResult {
        let params: QueryMetricsParams = match parse_params(arguments) {
            Ok(params) => params,
            Err(e) => return e.into(),
        };
        self.query(&params).await.into()
    }
}
