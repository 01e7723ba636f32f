//! MCP Server
//!
//! Routes JSON-RPC messages to the tool dispatcher. Shared by the stdio and
//! HTTP transports.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::debug;

use super::protocol::{
    error_response, success_response, RpcError, MCP_PROTOCOL_VERSION, MCP_SERVER_NAME,
};
use crate::tools::{tool_definitions_json, ToolDispatcher};

#[derive(Clone)]
pub struct McpServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl McpServer {
    pub fn new(dispatcher: Arc<ToolDispatcher>) -> Self {
        Self { dispatcher }
    }

    // == Handle Message ==
    /// Handles one incoming message (single or batch) and returns the
    /// responses to send back. Notifications produce none.
    pub async fn handle_message(&self, incoming: Value) -> Vec<Value> {
        let mut responses = Vec::new();

        if let Some(batch) = incoming.as_array() {
            if batch.is_empty() {
                responses.push(error_response(
                    Value::Null,
                    RpcError::invalid_request("Batch request must not be empty"),
                ));
                return responses;
            }
            for item in batch {
                if let Some(response) = self.handle_single(item).await {
                    responses.push(response);
                }
            }
            return responses;
        }

        if let Some(response) = self.handle_single(&incoming).await {
            responses.push(response);
        }
        responses
    }

    async fn handle_single(&self, incoming: &Value) -> Option<Value> {
        let Some(obj) = incoming.as_object() else {
            return Some(error_response(
                Value::Null,
                RpcError::invalid_request("Request must be a JSON object"),
            ));
        };

        let id = obj.get("id").cloned();
        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            return Some(error_response(
                id.unwrap_or(Value::Null),
                RpcError::invalid_request("jsonrpc must be '2.0'"),
            ));
        }

        let Some(method) = obj.get("method").and_then(Value::as_str) else {
            // Responses from the client; this server never issues requests
            return None;
        };

        let Some(id) = id else {
            debug!(method, "Ignoring notification");
            return None;
        };

        let params = obj.get("params").cloned().unwrap_or(Value::Null);
        Some(match self.handle_request(method, params).await {
            Ok(result) => success_response(id, result),
            Err(err) => error_response(id, err),
        })
    }

    async fn handle_request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(initialize_payload()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tool_definitions_json() })),
            "tools/call" => self.handle_tools_call(params).await,
            _ => Err(RpcError::method_not_found(method)),
        }
    }

    async fn handle_tools_call(&self, params: Value) -> Result<Value, RpcError> {
        let params = params
            .as_object()
            .ok_or_else(|| RpcError::invalid_params("tools/call params must be an object"))?;

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::invalid_params("tools/call requires string field 'name'"))?;

        let arguments = match params.get("arguments") {
            Some(Value::Object(map)) => map.clone(),
            None | Some(Value::Null) => Map::new(),
            Some(_) => return Err(RpcError::invalid_params("tools/call arguments must be an object")),
        };

        let result = self.dispatcher.call(name, &arguments).await;
        serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
    }
}

fn initialize_payload() -> Value {
    json!({
        "protocolVersion": MCP_PROTOCOL_VERSION,
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": MCP_SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}
