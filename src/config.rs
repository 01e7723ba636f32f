//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;

/// Default remote API base URL
pub const DEFAULT_API_URL: &str = "https://api.airtable.com/v0";

// == Transport ==
/// Which inbound transport the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
    /// JSON-RPC and plain tool endpoints over HTTP
    Http,
}

impl FromStr for Transport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(ConfigError::InvalidValue {
                var: "MCP_TRANSPORT",
                value: other.to_string(),
            }),
        }
    }
}

/// Server configuration parameters.
///
/// Only the credential is required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the remote API
    pub api_key: String,
    /// Remote API base URL
    pub api_url: String,
    /// Inbound transport
    pub transport: Transport,
    /// HTTP server port (http transport only)
    pub server_port: u16,
    /// Retention window for cached schemas, in seconds
    pub cache_max_age: u64,
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Preview truncation limit in characters
    pub preview_limit: usize,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Outbound request timeout in seconds
    pub request_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `AIRTABLE_API_KEY` - Bearer credential (required)
    /// - `AIRTABLE_API_URL` - Remote API base URL (default: https://api.airtable.com/v0)
    /// - `MCP_TRANSPORT` - `stdio` or `http` (default: stdio)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SCHEMA_CACHE_MAX_AGE` - Retention window in seconds (default: 1800)
    /// - `SCHEMA_CHUNK_SIZE` - Chunk target size (default: 15000)
    /// - `PREVIEW_LIMIT` - Preview truncation limit (default: 5000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `REQUEST_TIMEOUT` - Outbound timeout in seconds (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("AIRTABLE_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("AIRTABLE_API_KEY"))?;

        let transport = match lookup("MCP_TRANSPORT") {
            Some(raw) => raw.parse()?,
            None => Transport::Stdio,
        };

        let defaults = Self::default();

        Ok(Self {
            api_key,
            api_url: lookup("AIRTABLE_API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_url),
            transport,
            server_port: parse_var(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            cache_max_age: parse_var(&lookup, "SCHEMA_CACHE_MAX_AGE")
                .unwrap_or(defaults.cache_max_age),
            chunk_size: parse_var(&lookup, "SCHEMA_CHUNK_SIZE")
                .filter(|v: &usize| *v > 0)
                .unwrap_or(defaults.chunk_size),
            preview_limit: parse_var(&lookup, "PREVIEW_LIMIT")
                .filter(|v: &usize| *v > 0)
                .unwrap_or(defaults.preview_limit),
            cleanup_interval: parse_var(&lookup, "CLEANUP_INTERVAL")
                .filter(|v: &u64| *v > 0)
                .unwrap_or(defaults.cleanup_interval),
            request_timeout: parse_var(&lookup, "REQUEST_TIMEOUT")
                .filter(|v: &u64| *v > 0)
                .unwrap_or(defaults.request_timeout),
        })
    }
}

/// Parses an optional variable, treating unparseable values as absent.
fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            transport: Transport::Stdio,
            server_port: 3000,
            cache_max_age: 30 * 60,
            chunk_size: 15_000,
            preview_limit: 5_000,
            cleanup_interval: 60,
            request_timeout: 30,
        }
    }
}
