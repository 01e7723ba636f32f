//! Airtable MCP - an Airtable tool server for LLM agents
//!
//! Exposes Airtable operations as MCP tools over stdio or HTTP. Oversized
//! base schemas are held in a chunked cache and served piecewise.

pub mod airtable;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod mcp;
pub mod models;
pub mod tasks;
pub mod tools;

pub use api::AppState;
pub use cache::{ChunkedCache, SharedCache};
pub use config::{Config, Transport};
pub use error::{CacheError, ConfigError, ToolError};
pub use format::ResponseFormatter;
pub use tasks::spawn_cleanup_task;
pub use tools::ToolDispatcher;
