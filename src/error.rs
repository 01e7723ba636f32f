//! Error types for the tool server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Lookup failures from the chunked cache.
///
/// These are ordinary values: the tool layer renders them as guidance text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Cache id unknown or already evicted
    #[error("Cache entry not found: {cache_id}")]
    NotFound { cache_id: String },

    /// Chunk index beyond the available chunks
    #[error("Invalid chunk offset {index} (entry has {total} chunks)")]
    OutOfRange { index: usize, total: usize },
}

impl CacheError {
    // == Hint ==
    /// Returns a human-readable hint telling the caller how to recover.
    pub fn hint(&self) -> String {
        match self {
            CacheError::NotFound { .. } => {
                "Cache entry not found. Please fetch the schema first with get_base_schema(base_id=...)."
                    .to_string()
            }
            CacheError::OutOfRange { total, .. } if *total == 0 => {
                "Invalid chunk offset: the cached schema is empty.".to_string()
            }
            CacheError::OutOfRange { total, .. } => format!(
                "Invalid chunk offset. Valid offsets are 0 to {}.",
                total - 1
            ),
        }
    }
}

// == Tool Error Enum ==
/// Per-call error type for tool invocations.
///
/// No variant is fatal: every one is converted into an error-flagged tool result.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The remote API rejected the call
    #[error("{message}")]
    RemoteApi { status: u16, message: String },

    /// The remote API could not be reached
    #[error("Request failed: {0}")]
    Transport(String),

    /// A field definition failed type-specific option validation
    #[error("{0}")]
    Validation(String),

    /// Missing or mistyped tool arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// No tool registered under this name
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Cache lookup failure
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        ToolError::Transport(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ToolError {
    fn into_response(self) -> Response {
        let status = match &self {
            ToolError::InvalidArguments(_) | ToolError::Validation(_) => StatusCode::BAD_REQUEST,
            ToolError::UnknownTool(_) | ToolError::Cache(CacheError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            ToolError::Cache(CacheError::OutOfRange { .. }) => StatusCode::BAD_REQUEST,
            ToolError::RemoteApi { .. } | ToolError::Transport(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Config Error Enum ==
/// Startup configuration failures.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is absent or empty
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),

    /// A variable holds a value outside its accepted set
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

// == Result Type Alias ==
/// Convenience Result type for tool handlers.
pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_hint_mentions_fetch() {
        let err = CacheError::NotFound {
            cache_id: "app1-1".to_string(),
        };
        assert!(err.hint().contains("fetch the schema first"));
    }

    #[test]
    fn test_out_of_range_hint_lists_valid_offsets() {
        let err = CacheError::OutOfRange { index: 3, total: 3 };
        assert!(err.hint().contains("0 to 2"));

        let empty = CacheError::OutOfRange { index: 0, total: 0 };
        assert!(empty.hint().contains("empty"));
    }

    #[test]
    fn test_tool_error_status_codes() {
        let resp = ToolError::InvalidArguments("x".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ToolError::UnknownTool("nope".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ToolError::RemoteApi {
            status: 422,
            message: "bad".into(),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_remote_error_displays_message_verbatim() {
        let err = ToolError::RemoteApi {
            status: 404,
            message: "Could not find table Foo".into(),
        };
        assert_eq!(err.to_string(), "Could not find table Foo");
    }
}
