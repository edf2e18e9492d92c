//! Tool handler contract and the result envelope every handler returns.

use rmcp::model::{CallToolResult, Content, JsonObject, RawContent, Tool};
use tracing::warn;

use super::error::ToolError;

/// Outcome of a single tool invocation.
///
/// Exactly one `ToolResult` is produced per dispatch. On the wire it becomes
/// an MCP `CallToolResult`, with `isError: true` for failures.
#[derive(Debug, Clone)]
pub enum ToolResult {
    Success(Vec<Content>),
    Failure(Vec<Content>),
}

impl ToolResult {
    /// Successful result with a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Success(vec![Content::text(text.into())])
    }

    /// Failed result with a single text item carrying the message.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!("{}", message);
        Self::Failure(vec![Content::text(message)])
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    pub fn content(&self) -> &[Content] {
        match self {
            Self::Success(content) | Self::Failure(content) => content,
        }
    }

    /// Concatenated text of all text items.
    pub fn text_content(&self) -> String {
        self.content()
            .iter()
            .filter_map(|item| match &item.raw {
                RawContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_call_result(self) -> CallToolResult {
        match self {
            Self::Success(content) => CallToolResult::success(content),
            Self::Failure(content) => CallToolResult::error(content),
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(error: ToolError) -> Self {
        Self::failure(error.to_string())
    }
}

impl From<Result<String, ToolError>> for ToolResult {
    fn from(result: Result<String, ToolError>) -> Self {
        match result {
            Ok(text) => Self::text(text),
            Err(error) => error.into(),
        }
    }
}

/// A callable tool.
///
/// Handlers receive arguments that already passed schema validation and must
/// turn every outcome, including backend failures, into a [`ToolResult`].
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Descriptor advertised by `tools/list`.
    fn tool(&self) -> Tool;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: JsonObject) -> ToolResult;
}

/// Deserialize validated arguments into a tool's parameter struct.
pub fn parse_params<T>(arguments: JsonObject) -> Result<T, ToolError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}
