// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC 2.0 envelope types
//!
//! Requests serialize as `{"jsonrpc":"2.0","method":...,"params":[...],"id":N}`.
//! Responses deserialize from `{"jsonrpc":...,"result":...,"id":...,"error":...}`.
//! In a batch, responses are matched to requests by array position; the `id`
//! is kept for logging only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::RpcError;

/// Protocol version string sent with every request
pub const JSONRPC_VERSION: &str = "2.0";

/// A single JSON-RPC request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Creates a request with the given method, positional params and id
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// The `error` member of a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A single JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    /// `None` for both an absent and a JSON `null` result
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    /// Builds a success response (used by mock transports)
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            id: Value::from(id),
            error: None,
        }
    }

    /// Builds an error response (used by mock transports)
    pub fn failure(id: u64, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            id: Value::from(id),
            error: Some(JsonRpcErrorObject {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Surfaces a non-null `error` member as [`RpcError::Protocol`] and
    /// otherwise returns the (possibly null) result.
    pub fn into_result(self) -> Result<Option<Value>, RpcError> {
        match self.error {
            Some(error) => Err(RpcError::protocol(error.code, error.message)),
            None => Ok(self.result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_strict_envelope() {
        let request = JsonRpcRequest::new("eth_getBlockByNumber", vec![json!("0x10"), json!(true)], 3);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "method": "eth_getBlockByNumber",
                "params": ["0x10", true],
                "id": 3
            })
        );
    }

    #[test]
    fn request_without_params_serializes_empty_array() {
        let request = JsonRpcRequest::new("eth_blockNumber", vec![], 1);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["params"], json!([]));
    }

    #[test]
    fn response_error_becomes_protocol_error() {
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": "method not found" }
        }))
        .unwrap();

        match response.into_result() {
            Err(RpcError::Protocol { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "method not found");
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn null_result_is_none() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert_eq!(response.into_result().unwrap(), None);
    }

    #[test]
    fn string_ids_are_accepted() {
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": "abc", "result": "0x1"}))
                .unwrap();
        assert_eq!(response.id, json!("abc"));
        assert_eq!(response.into_result().unwrap(), Some(json!("0x1")));
    }
}
