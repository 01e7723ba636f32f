//! API Handlers
//!
//! HTTP request handlers for the tool server endpoints.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;

use crate::airtable::{AirtableClient, TabularApi};
use crate::cache::{ChunkedCache, SharedCache};
use crate::config::Config;
use crate::error::Result;
use crate::format::ResponseFormatter;
use crate::mcp::{error_response, McpServer, RpcError};
use crate::models::{HealthResponse, StatsResponse, ToolCallRequest, ToolListResponse, ToolResult};
use crate::tools::{tool_definitions_json, ToolDispatcher};

/// Application state shared across all handlers and both transports.
#[derive(Clone)]
pub struct AppState {
    /// Tool dispatcher
    pub dispatcher: Arc<ToolDispatcher>,
    /// JSON-RPC front end over the same dispatcher
    pub mcp: McpServer,
    /// Shared chunked cache
    pub cache: SharedCache,
}

impl AppState {
    /// Creates a new AppState around the given API client and cache.
    pub fn new(api: Arc<dyn TabularApi>, cache: ChunkedCache, formatter: ResponseFormatter) -> Self {
        let cache: SharedCache = Arc::new(RwLock::new(cache));
        let dispatcher = Arc::new(ToolDispatcher::new(api, Arc::clone(&cache), formatter));
        Self {
            mcp: McpServer::new(Arc::clone(&dispatcher)),
            dispatcher,
            cache,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the reqwest client and sizes the cache from the Config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = AirtableClient::from_config(config)?;
        let cache = ChunkedCache::new(config.chunk_size, config.cache_max_age);
        Ok(Self::new(
            Arc::new(api),
            cache,
            ResponseFormatter::new(config.preview_limit),
        ))
    }
}

/// Handler for POST /mcp
///
/// JSON-RPC over HTTP. A single request gets a single response object, a
/// batch gets an array, and notifications get 202 with no body. A body that
/// is not JSON gets a -32700 error envelope, as on stdio.
pub async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let incoming: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "Unparseable JSON-RPC body");
            let response = error_response(Value::Null, RpcError::parse_error(format!("Parse error: {err}")));
            return (StatusCode::OK, Json(response)).into_response();
        }
    };

    let is_batch = incoming.is_array();
    let mut responses = state.mcp.handle_message(incoming).await;

    if is_batch && !responses.is_empty() {
        (StatusCode::OK, Json(Value::Array(responses))).into_response()
    } else if let Some(response) = responses.pop() {
        (StatusCode::OK, Json(response)).into_response()
    } else {
        StatusCode::ACCEPTED.into_response()
    }
}

/// Handler for GET /tools
pub async fn list_tools_handler() -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: tool_definitions_json(),
    })
}

/// Handler for POST /tools/call
///
/// Malformed requests are rejected with 400; tool failures come back as
/// 200 with `isError` set, the same as over JSON-RPC.
pub async fn call_tool_handler(
    State(state): State<AppState>,
    Json(req): Json<ToolCallRequest>,
) -> Result<Json<ToolResult>> {
    let (name, arguments) = req.into_parts()?;
    Ok(Json(state.dispatcher.call(&name, &arguments).await))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
