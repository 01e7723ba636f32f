//! Remote API Client
//!
//! `TabularApi` is the seam between tool handlers and the remote service;
//! `AirtableClient` implements it over HTTPS with a bearer credential.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, ToolError};

// == Api Request ==
/// A single call against the remote API, relative to its base URL.
///
/// The path is held as raw segments; they are percent-encoded only when the
/// final URL is built, so names with spaces, `#` or `?` stay one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new<I>(method: Method, segments: I, body: Option<Value>) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::<String>::into).collect(),
            query: Vec::new(),
            body,
        }
    }

    pub fn get<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(Method::GET, segments, None)
    }

    pub fn post<I>(segments: I, body: Value) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(Method::POST, segments, Some(body))
    }

    pub fn patch<I>(segments: I, body: Value) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(Method::PATCH, segments, Some(body))
    }

    pub fn delete<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(Method::DELETE, segments, None)
    }

    /// Unencoded path, for logs and test assertions.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Appends one query pair. Repeated keys are kept in order.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Value of the first query pair named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// == Tabular Api Trait ==
/// Remote tabular-data API.
///
/// Implementations return the decoded JSON body on success and a
/// `ToolError::RemoteApi` carrying the remote error description otherwise.
#[async_trait]
pub trait TabularApi: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}

// == Airtable Client ==
/// reqwest-backed client for the Airtable Web API.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AirtableClient {
    /// Builds a client with the given base URL, credential, and timeout.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("airtable_mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Builds a client from server configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_url,
            &config.api_key,
            Duration::from_secs(config.request_timeout),
        )
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[String]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ToolError::Transport(format!("Invalid API URL: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| ToolError::Transport("API URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl TabularApi for AirtableClient {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.url(&request.segments)?;
        debug!(method = %request.method, %url, "Calling remote API");

        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .bearer_auth(&self.api_key);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = parse_body(&bytes);

        if status.is_success() {
            Ok(body)
        } else {
            let message = remote_error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
            warn!(status = status.as_u16(), %url, %message, "Remote API rejected call");
            Err(ToolError::RemoteApi {
                status: status.as_u16(),
                message,
            })
        }
    }
}

// == Utility Functions ==
/// Decodes a response body. Empty bodies become `{}`, non-JSON bodies a string.
fn parse_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return json!({});
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Extracts the human-readable description from an error body.
///
/// Handles `{"error": {"message": ..}}`, `{"error": {"type": ..}}`,
/// `{"error": ".."}`, and plain string bodies.
pub fn remote_error_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Object(map) => match map.get("error")? {
            Value::String(text) => Some(text.clone()),
            Value::Object(error) => error
                .get("message")
                .or_else(|| error.get("type"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        },
        _ => None,
    }
}
