//! TraceQL search tool definition.
//!
//! Searches Tempo for traces matching a service name and tag filters, or a
//! raw TraceQL expression, within a time range. Unlike `get_traces`, the
//! range bounds are parsed here because the search endpoint only accepts
//! unix seconds.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::{
    handler::server::tool::cached_schema_for_type,
    model::{JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::client::TempoClient;
use super::common::{parse_unix_seconds, pretty_json};
use crate::domains::tools::error::ToolError;
use crate::domains::tools::handlers::{ToolHandler, ToolResult, parse_params};

/// Parameters for trace search.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchTracesParams {
    /// Service name to filter on.
    #[serde(default)]
    #[schemars(description = "Service name to search for")]
    pub service: Option<String>,

    /// Span attribute filters.
    #[serde(default)]
    #[schemars(description = "Tag filters as key/value pairs")]
    pub tags: Option<BTreeMap<String, String>>,

    /// Raw TraceQL expression.
    #[serde(default)]
    #[schemars(
        description = "TraceQL query. When given, 'service' and 'tags' are ignored."
    )]
    pub traceql: Option<String>,

    /// Start of the search range.
    #[schemars(description = "Search start time (ISO 8601)")]
    pub start: String,

    /// End of the search range.
    #[schemars(description = "Search end time (ISO 8601)")]
    pub end: String,
}

/// A resolved search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub traceql: String,
    pub start: i64,
    pub end: i64,
}

impl SearchQuery {
    /// Resolve parameters into a query, parsing the time range.
    pub fn from_params(params: &SearchTracesParams) -> Result<Self, ToolError> {
        let (Some(start), Some(end)) = (
            parse_unix_seconds(&params.start),
            parse_unix_seconds(&params.end),
        ) else {
            return Err(ToolError::invalid_arguments(
                "Invalid date format. Please use ISO 8601 format (e.g. 2023-01-01T00:00:00Z)",
            ));
        };

        let traceql = match params.traceql.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.to_string(),
            _ => build_traceql(
                params.service.as_deref(),
                params.tags.as_ref().unwrap_or(&BTreeMap::new()),
            )?,
        };

        Ok(Self {
            traceql,
            start,
            end,
        })
    }
}

/// Build a TraceQL expression from a service name and tag filters.
///
/// Each condition is its own spanset, joined with `&&`. Values are quoted
/// and escaped; keys must be plain attribute names.
pub fn build_traceql(
    service: Option<&str>,
    tags: &BTreeMap<String, String>,
) -> Result<String, ToolError> {
    if let Some(key) = tags.keys().find(|key| !is_attribute_name(key)) {
        return Err(ToolError::invalid_arguments(format!(
            "Invalid tag name '{}': use letters, digits, '_', '.', ':' or '-'",
            key
        )));
    }

    let service = service
        .filter(|s| !s.is_empty())
        .map(|s| format!("{{ resource.service.name = \"{}\" }}", escape(s)));

    let tags = tags
        .iter()
        .map(|(key, value)| format!("{{ {} = \"{}\" }}", key, escape(value)));

    Ok(service.into_iter().chain(tags).collect::<Vec<_>>().join(" && "))
}

fn is_attribute_name(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-'))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// TraceQL search tool - finds traces by service, tags or TraceQL.
pub struct SearchTracesTool {
    client: Arc<TempoClient>,
}

impl SearchTracesTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "search_traces";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Search Grafana Tempo for traces using TraceQL, by service name and tags or a raw TraceQL query, within a time range.";

    pub fn new(client: Arc<TempoClient>) -> Self {
        Self { client }
    }

    #[instrument(skip_all, fields(q = %query.traceql))]
    pub async fn search(&self, query: &SearchQuery) -> Result<String, ToolError> {
        info!("Searching traces from {} to {}", query.start, query.end);

        let start = query.start.to_string();
        let end = query.end.to_string();
        let mut pairs = Vec::with_capacity(3);
        if !query.traceql.is_empty() {
            pairs.push(("q", query.traceql.as_str()));
        }
        pairs.push(("start", start.as_str()));
        pairs.push(("end", end.as_str()));

        let url = self.client.search_url(&pairs)?;
        let body = self.client.get_json(&url).await?;

        let traces = body
            .get("traces")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        debug!(
            "Search returned {} trace(s)",
            traces.as_array().map(Vec::len).unwrap_or(0)
        );
        Ok(pretty_json(&traces))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<SearchTracesParams>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

#[async_trait::async_trait]
impl ToolHandler for SearchTracesTool {
    fn tool(&self) -> Tool {
        Self::to_tool()
    }

    async fn execute(&self, arguments: JsonObject) -> ToolResult {
        let query = match parse_params::<SearchTracesParams>(arguments)
            .and_then(|params| SearchQuery::from_params(&params))
        {
            Ok(query) => query,
            Err(e) => return e.into(),
        };
        self.search(&query).await.into()
    }
}
