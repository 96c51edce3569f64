//! JSON-RPC 2.0 message shapes for the reload call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reload method understood by the pathfinder for edge-list snapshots.
pub const DEFAULT_RELOAD_METHOD: &str = "load_edges_binary";

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P: Serialize> {
    pub id: u64,
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReloadParams<'a> {
    pub file: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcError {
    /// Read a non-null `error` member of any shape.
    ///
    /// Missing or non-integer `code` becomes 0. An error that is not an
    /// object with a string `message` is rendered as its JSON text.
    fn from_value(error: &Value) -> Self {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = match error.get("message").and_then(Value::as_str) {
            Some(message) => message.to_owned(),
            None => match error.as_str() {
                Some(message) => message.to_owned(),
                None => error.to_string(),
            },
        };
        Self { code, message }
    }
}

/// What the pathfinder answered to a successful reload.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadResponse {
    /// Raw response body, logged verbatim.
    pub body: String,
    /// The JSON-RPC `result` member, if the body was a JSON-RPC response.
    pub result: Option<Value>,
}

/// Split a response body into result or error.
///
/// Any non-null `error` member is a failure. Bodies that are not JSON
/// objects are accepted as opaque success.
pub fn interpret_body(body: String) -> Result<ReloadResponse, JsonRpcError> {
    let Ok(Value::Object(mut response)) = serde_json::from_str::<Value>(&body) else {
        return Ok(ReloadResponse { body, result: None });
    };
    match response.get("error") {
        None | Some(Value::Null) => {}
        Some(error) => return Err(JsonRpcError::from_value(error)),
    }
    let result = response.remove("result");
    Ok(ReloadResponse { body, result })
}
