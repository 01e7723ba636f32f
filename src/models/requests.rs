//! Request DTOs for the tool server
//!
//! Defines the structure of incoming tool invocations.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ToolError;

/// A tool invocation: tool name plus key-value arguments.
///
/// Used as the body of `POST /tools/call` and as the `params` of a JSON-RPC
/// `tools/call` request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallRequest {
    /// Registered tool name
    pub name: String,
    /// Tool arguments; absent or null means no arguments
    #[serde(default)]
    pub arguments: Option<Value>,
}

impl ToolCallRequest {
    /// Validates the request and returns its arguments as an object.
    pub fn into_parts(self) -> Result<(String, Map<String, Value>), ToolError> {
        if self.name.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "Tool name cannot be empty".to_string(),
            ));
        }

        let arguments = match self.arguments {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => {
                return Err(ToolError::InvalidArguments(
                    "Tool arguments must be an object".to_string(),
                ))
            }
        };

        Ok((self.name, arguments))
    }
}
