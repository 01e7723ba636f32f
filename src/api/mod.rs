//! API Module
//!
//! HTTP handlers and routing for the HTTP transport.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
