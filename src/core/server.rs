//! MCP Server implementation.
//!
//! The server owns the immutable [`ToolRegistry`] and answers protocol
//! requests. Tool invocations always end in exactly one [`ToolResult`]:
//! unknown names, invalid arguments, backend failures and even handler
//! panics are all turned into error envelopes here, so the transport loop
//! only ever has a response to write.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use rmcp::model::{
    Implementation, InitializeResult, JsonObject, ListToolsResult, ProtocolVersion,
    ServerCapabilities, ServerInfo, Tool,
};
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use super::config::Config;
use super::error::Result;
use super::transport::jsonrpc::JsonRpcResponse;
use crate::domains::tools::{FieldKind, ToolError, ToolRegistry, ToolResult, validate};

/// MCP protocol revisions this server can speak, oldest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

const INSTRUCTIONS: &str = "This server queries Grafana Tempo. Use get_traces to fetch traces for a service in a time window, get_trace to fetch one trace by ID, search_traces for TraceQL searches and query_metrics for TraceQL metrics.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Registered tools, read-only after startup.
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    /// Create a new MCP server with every Tempo tool registered.
    pub fn new(config: Config) -> Result<Self> {
        let registry = ToolRegistry::from_config(&config)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a server around an explicitly built registry.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// List all available tools.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.registry.list()
    }

    /// Call a tool by name.
    ///
    /// Resolves the tool, validates `arguments` against its schema and runs
    /// the handler. A panic anywhere in validation or execution is caught
    /// and reported as an error envelope.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        let outcome = AssertUnwindSafe(self.dispatch(name, arguments))
            .catch_unwind()
            .await;

        match outcome {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(&*panic);
                error!("Tool {} panicked: {}", name, message);
                ToolResult::failure(format!("Tool execution failed: {}", message))
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        let entry = match self.registry.resolve(name) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Unknown tool requested: {}", name);
                return e.into();
            }
        };

        let arguments = match arguments {
            None | Some(Value::Null) => JsonObject::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return ToolError::invalid_arguments(format!(
                    "arguments must be an object, got {}",
                    FieldKind::of(&other)
                ))
                .into();
            }
        };

        let validation = validate(entry.schema(), &arguments);
        if !validation.is_valid() {
            return ToolError::from(validation).into();
        }

        info!("Executing tool: {}", name);
        entry.handler().execute(arguments).await
    }

    /// Build the `initialize` result.
    ///
    /// The client's requested protocol version is echoed when supported,
    /// otherwise the newest supported version is offered.
    pub fn initialize_result(&self, params: Option<&Value>) -> serde_json::Result<InitializeResult> {
        let latest = SUPPORTED_PROTOCOL_VERSIONS[SUPPORTED_PROTOCOL_VERSIONS.len() - 1];
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .filter(|requested| SUPPORTED_PROTOCOL_VERSIONS.contains(requested))
            .unwrap_or(latest);
        let protocol_version: ProtocolVersion = serde_json::from_value(json!(requested))?;

        Ok(ServerInfo {
            protocol_version,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        })
    }

    /// Answer a single request. Always produces exactly one response.
    #[instrument(skip(self, id, params))]
    pub async fn handle_request(
        &self,
        id: Value,
        method: &str,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        match method {
            "initialize" => {
                info!("Processing initialize request");
                let result = self
                    .initialize_result(params.as_ref())
                    .and_then(serde_json::to_value);
                match result {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(e) => JsonRpcResponse::internal_error(id, e.to_string()),
                }
            }

            "ping" => JsonRpcResponse::success(id, json!({})),

            "tools/list" => {
                info!("Processing tools/list request");
                let result = ListToolsResult {
                    tools: self.list_tools(),
                    next_cursor: None,
                    meta: None,
                };
                match serde_json::to_value(result) {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(e) => JsonRpcResponse::internal_error(id, e.to_string()),
                }
            }

            "tools/call" => {
                info!("Processing tools/call request");
                let Some(params) = params else {
                    return JsonRpcResponse::invalid_params(id, "Missing params");
                };
                let Some(name) = params.get("name").and_then(Value::as_str) else {
                    return JsonRpcResponse::invalid_params(id, "Missing tool name");
                };
                let arguments = params.get("arguments").cloned();

                let result = self.call_tool(name, arguments).await.into_call_result();
                match serde_json::to_value(result) {
                    Ok(result) => JsonRpcResponse::success(id, result),
                    Err(e) => JsonRpcResponse::internal_error(id, e.to_string()),
                }
            }

            _ => {
                warn!("Unknown method: {}", method);
                JsonRpcResponse::method_not_found(id, method)
            }
        }
    }

    /// Handle a notification. Notifications are never answered.
    pub fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => info!("Client sent initialized notification"),
            _ => debug!("Received notification: {}", method),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::ToolHandler;
    use rmcp::handler::server::tool::cached_schema_for_type;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_server() -> McpServer {
        McpServer::new(Config::default()).unwrap()
    }

    fn server_for(base_url: &str) -> McpServer {
        let mut config = Config::default();
        config.tempo.base_url = base_url.to_string();
        McpServer::new(config).unwrap()
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct PanicParams {
        reason: String,
    }

    struct PanickingTool;

    #[async_trait::async_trait]
    impl ToolHandler for PanickingTool {
        fn tool(&self) -> Tool {
            Tool {
                name: "explode".into(),
                description: Some("Always panics".into()),
                input_schema: cached_schema_for_type::<PanicParams>(),
                annotations: None,
                output_schema: None,
                icons: None,
                meta: None,
                title: None,
            }
        }

        async fn execute(&self, arguments: JsonObject) -> ToolResult {
            let reason = arguments
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            panic!("{}", reason);
        }
    }

    fn panicking_server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry.register(PanickingTool).unwrap();
        McpServer::with_registry(Config::default(), registry)
    }

    #[tokio::test]
    async fn test_unknown_tool_envelope_is_exact() {
        let server = test_server();
        let response = server
            .handle_request(
                json!(1),
                "tools/call",
                Some(json!({ "name": "does_not_exist", "arguments": {} })),
            )
            .await;

        let result = response.result.unwrap();
        assert_eq!(
            result,
            json!({ "content": [{ "type": "text", "text": "Unknown tool" }], "isError": true })
        );
    }

    #[tokio::test]
    async fn test_missing_field_is_reported() {
        let server = test_server();
        let result = server
            .call_tool(
                "get_traces",
                Some(json!({ "service_name": "checkout", "start_time": "2024-01-01T00:00:00Z" })),
            )
            .await;
        assert!(result.is_error());
        assert!(result.text_content().contains("end_time"));
    }

    #[tokio::test]
    async fn test_mistyped_field_is_reported() {
        let server = test_server();
        let result = server
            .call_tool(
                "get_traces",
                Some(json!({ "service_name": 42, "start_time": "a", "end_time": "b" })),
            )
            .await;
        assert!(result.is_error());
        assert_eq!(
            result.text_content(),
            "Invalid arguments: field 'service_name' must be string, got number"
        );
    }

    #[tokio::test]
    async fn test_non_object_arguments() {
        let server = test_server();
        let result = server.call_tool("get_traces", Some(json!(["checkout"]))).await;
        assert!(result.is_error());
        assert!(result.text_content().contains("must be an object"));
    }

    #[tokio::test]
    async fn test_null_arguments_treated_as_absent() {
        let server = test_server();
        let result = server
            .handle_request(
                json!(4),
                "tools/call",
                Some(json!({ "name": "get_trace", "arguments": null })),
            )
            .await
            .result
            .unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert_eq!(text, "Invalid arguments: missing required field 'trace_id'");
    }

    #[tokio::test]
    async fn test_absent_arguments_fail_validation() {
        let server = test_server();
        let result = server.call_tool("get_trace", None).await;
        assert!(result.is_error());
        assert!(result.text_content().contains("trace_id"));
    }

    #[tokio::test]
    async fn test_backend_success_passthrough() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/traces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "traces": [] })))
            .mount(&backend)
            .await;

        let server = server_for(&backend.uri());
        let response = server
            .handle_request(
                json!("req-1"),
                "tools/call",
                Some(json!({
                    "name": "get_traces",
                    "arguments": {
                        "service_name": "checkout",
                        "start_time": "2024-01-01T00:00:00Z",
                        "end_time": "2024-01-01T01:00:00Z"
                    }
                })),
            )
            .await;

        assert_eq!(response.id, json!("req-1"));
        let result = response.result.unwrap();
        assert_ne!(result["isError"], json!(true));
        assert_eq!(result["content"].as_array().map(Vec::len), Some(1));
        assert_eq!(result["content"][0]["text"], "{\n  \"traces\": []\n}");
    }

    #[tokio::test]
    async fn test_listing_makes_no_backend_calls() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&backend)
            .await;

        let server = server_for(&backend.uri());
        let first = server.handle_request(json!(1), "tools/list", None).await;
        let second = server.handle_request(json!(2), "tools/list", None).await;
        assert_eq!(first.result, second.result);

        let tools = first.result.unwrap();
        assert!(tools.get("nextCursor").is_none());
        let names: Vec<_> = tools["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            ["get_traces", "get_trace", "search_traces", "query_metrics"]
        );
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_failure() {
        let server = panicking_server();
        let result = server
            .call_tool("explode", Some(json!({ "reason": "kaboom" })))
            .await;
        assert!(result.is_error());
        assert_eq!(result.text_content(), "Tool execution failed: kaboom");

        // The server is still usable afterwards.
        let listed = server.handle_request(json!(2), "tools/list", None).await;
        assert!(listed.error.is_none());
    }

    #[tokio::test]
    async fn test_initialize_negotiates_version() {
        let server = test_server();
        let response = server
            .handle_request(
                json!(0),
                "initialize",
                Some(json!({ "protocolVersion": "2024-11-05", "capabilities": {} })),
            )
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "tempo-mcp-server");
        assert!(result["capabilities"]["tools"].is_object());

        assert_eq!(result["instructions"], INSTRUCTIONS);

        let unknown = server
            .initialize_result(Some(&json!({ "protocolVersion": "1999-01-01" })))
            .unwrap();
        let unknown = serde_json::to_value(unknown).unwrap();
        assert_eq!(unknown["protocolVersion"], "2025-06-18");
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = test_server();

        let missing_name = server
            .handle_request(json!(1), "tools/call", Some(json!({ "arguments": {} })))
            .await;
        assert_eq!(missing_name.error.map(|e| e.code), Some(-32602));

        let missing_params = server.handle_request(json!(2), "tools/call", None).await;
        assert_eq!(missing_params.error.map(|e| e.code), Some(-32602));

        let unknown = server.handle_request(json!(3), "resources/list", None).await;
        let error = unknown.error.unwrap();
        assert_eq!(error.code, -32601);
        assert!(error.message.contains("resources/list"));
    }

    #[tokio::test]
    async fn test_ping() {
        let response = test_server().handle_request(json!(9), "ping", None).await;
        assert_eq!(response.result, Some(json!({})));
    }
}
