//! MCP Module
//!
//! JSON-RPC 2.0 message handling for the Model Context Protocol, and the
//! stdio transport. The HTTP transport lives in `api`.

mod protocol;
mod server;
mod stdio;

pub use protocol::{error_response, success_response, RpcError, MCP_PROTOCOL_VERSION, MCP_SERVER_NAME};
pub use server::McpServer;
pub use stdio::{serve_lines, serve_stdio};
