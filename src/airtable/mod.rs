//! Airtable Module
//!
//! Outbound side of the server: the remote API seam, its reqwest-backed
//! implementation, and field definition checks done before any request.

pub mod client;
pub mod fields;

pub use client::{AirtableClient, ApiRequest, TabularApi};
pub use fields::{prepare_field, FieldDefinition, FieldType};
