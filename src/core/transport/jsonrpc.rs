//! JSON-RPC 2.0 message types and parsing.
//!
//! One message is one JSON value. Parsing never fails outright: anything that
//! is not a well-formed request or notification becomes
//! [`Incoming::Malformed`], carrying the request ID when one can still be
//! recovered so the caller can answer with an `Invalid Request` error.

use rmcp::model::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: code.0,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::error(
            id,
            ErrorCode::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    /// Invalid request error.
    pub fn invalid_request(id: Value, msg: impl Into<String>) -> Self {
        Self::error(id, ErrorCode::INVALID_REQUEST, msg)
    }

    /// Invalid params error.
    pub fn invalid_params(id: Value, msg: impl Into<String>) -> Self {
        Self::error(id, ErrorCode::INVALID_PARAMS, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Value, msg: impl Into<String>) -> Self {
        Self::error(id, ErrorCode::INTERNAL_ERROR, msg)
    }
}

/// A parsed incoming message.
#[derive(Debug, Clone)]
pub enum Incoming {
    /// A request expecting exactly one response.
    Request {
        id: Value,
        method: String,
        params: Option<Value>,
    },

    /// A notification; never answered.
    Notification {
        method: String,
        params: Option<Value>,
    },

    /// Not a valid message. `id` is set when it could be recovered.
    Malformed { id: Option<Value>, reason: String },
}

/// Parse one framed message.
pub fn parse_message(bytes: &[u8]) -> Incoming {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            return Incoming::Malformed {
                id: None,
                reason: format!("Parse error: {}", e),
            };
        }
    };

    let id = value.get("id").filter(|id| !id.is_null()).cloned();

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            return Incoming::Malformed {
                id,
                reason: format!("Invalid Request: {}", e),
            };
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Incoming::Malformed {
            id,
            reason: format!("Invalid Request: unsupported jsonrpc version {:?}", request.jsonrpc),
        };
    }

    match id {
        Some(id) => Incoming::Request {
            id,
            method: request.method,
            params: request.params,
        },
        None => Incoming::Notification {
            method: request.method,
            params: request.params,
        },
    }
}
