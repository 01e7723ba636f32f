//! Request and Response models for the tool server
//!
//! This module defines the DTOs (Data Transfer Objects) exchanged with
//! callers over either transport.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::ToolCallRequest;
pub use responses::{ContentBlock, HealthResponse, StatsResponse, ToolListResponse, ToolResult};
