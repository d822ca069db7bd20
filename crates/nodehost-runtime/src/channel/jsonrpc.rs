//! JSON-RPC 2.0 payload helpers.
//!
//! The channel does not care what it carries; these only build and parse
//! the payloads the node speaks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Request with an empty positional parameter list.
    pub fn without_params(id: u64, method: impl Into<String>) -> Self {
        Self::new(id, method, Value::Array(Vec::new()))
    }

    /// Single-line encoding, ready for [`ControlChannel::send`](super::ControlChannel::send).
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    pub fn parse(message: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(message)
    }

    /// Whether this answers the request with `id`.
    pub fn answers(&self, id: u64) -> bool {
        self.id.as_ref().and_then(Value::as_u64) == Some(id)
    }

    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
