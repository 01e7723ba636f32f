//! Shared test fixtures: an in-process fake of the remote API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use airtable_mcp::airtable::{ApiRequest, TabularApi};
use airtable_mcp::cache::{ChunkedCache, ManualClock};
use airtable_mcp::error::{Result, ToolError};
use airtable_mcp::format::ResponseFormatter;
use airtable_mcp::AppState;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Canned responses keyed by `"METHOD /path"`, plus a log of every request.
#[derive(Default)]
pub struct FakeApi {
    responses: Mutex<HashMap<String, std::result::Result<Value, (u16, String)>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: &str, path: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), Ok(body));
    }

    pub fn fail(&self, method: &str, path: &str, status: u16, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), Err((status, message.to_string())));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl TabularApi for FakeApi {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let key = format!("{} {}", request.method, request.path());
        self.requests.lock().unwrap().push(request);

        match self.responses.lock().unwrap().get(&key) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err((status, message))) => Err(ToolError::RemoteApi {
                status: *status,
                message: message.clone(),
            }),
            None => Err(ToolError::RemoteApi {
                status: 404,
                message: format!("NOT_FOUND: {key}"),
            }),
        }
    }
}

/// State wired to `api`, with a manual clock and the given chunk size.
pub fn test_state(api: Arc<FakeApi>, clock: Arc<ManualClock>, chunk_size: usize) -> AppState {
    let cache = ChunkedCache::with_clock(chunk_size, 30 * 60, clock);
    AppState::new(api, cache, ResponseFormatter::default())
}

/// A schema payload with `tables` tables of `fields` fields each.
pub fn schema_payload(tables: usize, fields: usize) -> Value {
    let tables: Vec<Value> = (0..tables)
        .map(|t| {
            let fields: Vec<Value> = (0..fields)
                .map(|f| json!({"id": format!("fld{t}x{f}"), "name": format!("Field {f}"), "type": "singleLineText"}))
                .collect();
            json!({
                "id": format!("tbl{t}"),
                "name": format!("Table {t}"),
                "primaryFieldId": format!("fld{t}x0"),
                "fields": fields,
                "views": [{"id": format!("viw{t}"), "name": "Grid view", "type": "grid"}],
            })
        })
        .collect();
    json!({ "tables": tables })
}

pub fn args(value: Value) -> serde_json::Map<String, Value> {
    value.as_object().cloned().expect("arguments must be an object")
}
