//! Tools Module
//!
//! The tool surface offered to agents: the advertised catalogue, argument
//! extraction, repeated-call tracking, and the dispatcher that runs calls.

mod args;
mod call_tracker;
mod dispatcher;
mod registry;

pub use args::ToolArgs;
pub use call_tracker::{CallTracker, MAX_TRACKED_CALLS, REPEAT_WARN_THRESHOLD};
pub use dispatcher::ToolDispatcher;
pub use registry::{tool_definitions, tool_definitions_json, ToolDefinition};
