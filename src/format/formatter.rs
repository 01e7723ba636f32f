//! Response Formatter
//!
//! Turns API results into tool output text. Small results are shown inline
//! (as previews when oversized), list results are enumerated, and full base
//! schemas are handed to the chunked cache and returned as a handle.

use serde_json::{json, Value};

use crate::cache::{CachedEntryInfo, Chunk, SchemaSummary, TableSummary};
use crate::error::{CacheError, ToolError};
use crate::format::{next_steps, truncate_preview, DEFAULT_PREVIEW_LIMIT};
use crate::models::ToolResult;

/// Object keys that wrap list-shaped responses
const LIST_KEYS: [&str; 7] = ["bases", "tables", "fields", "views", "webhooks", "payloads", "records"];

// == Response Formatter ==
/// Renders tool results.
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    /// Limit for single-result previews
    pub preview_limit: usize,
    /// Limit for the detailed section of list results
    pub detail_limit: usize,
    /// Number of list items shown in detail
    pub detail_items: usize,
    /// Number of tables listed in a cached-schema summary
    pub summary_table_cap: usize,
}

impl Default for ResponseFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_LIMIT)
    }
}

impl ResponseFormatter {
    pub fn new(preview_limit: usize) -> Self {
        Self {
            preview_limit,
            detail_limit: 3_000,
            detail_items: 3,
            summary_table_cap: 10,
        }
    }

    // == Success ==
    /// Single-object results and acknowledgements.
    pub fn success(&self, operation: &str, data: &Value) -> ToolResult {
        ToolResult::text(format!(
            "✅ {operation} completed successfully:\n\n{}",
            truncate_preview(data, self.preview_limit)
        ))
    }

    // == Failure ==
    /// Error-flagged result naming the failed operation.
    pub fn failure(&self, operation: &str, error: &ToolError) -> ToolResult {
        let description = match error {
            ToolError::Cache(cache_error) => cache_error.hint(),
            other => other.to_string(),
        };
        ToolResult::error(format!("❌ {operation} failed: {description}"))
    }

    // == List ==
    /// List-shaped results: every item's name and id, details for the first
    /// few, then next-step guidance.
    ///
    /// `data` may be a bare array or an object wrapping one.
    pub fn list(&self, operation: &str, item_type: &str, data: &Value, base_id: Option<&str>) -> ToolResult {
        let items = list_items(data);
        let pagination = cursor_pagination(operation, data);
        if items.is_empty() {
            let mut text = format!("✅ {operation} completed: No {item_type}s found.");
            if let Some(pagination) = pagination {
                text.push_str("\n\n");
                text.push_str(&pagination);
            }
            return ToolResult::text(text);
        }

        let all_items = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let label = item_label(item, item_type, index);
                match str_field(item, "id") {
                    "" => label,
                    id => format!("{label} ({id})"),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let shown = items.len().min(self.detail_items);
        let details = truncate_preview(&Value::Array(items[..shown].to_vec()), self.detail_limit);

        let mut text = format!(
            "✅ {operation} completed: Found {} {item_type}(s)\n\n🔍 All {item_type}s: {all_items}\n\n📊 Detailed info for first {shown}:\n{details}",
            items.len()
        );
        if let Some(steps) = next_steps(operation, base_id, None) {
            text.push_str("\n\n");
            text.push_str(&steps);
        }
        if let Some(pagination) = pagination {
            text.push_str("\n\n");
            text.push_str(&pagination);
        }
        ToolResult::text(text)
    }

    // == Records ==
    /// Record pages: every record id, details for the first few, and
    /// pagination guidance driven by the continuation token.
    pub fn records(&self, operation: &str, data: &Value, base_id: &str, table_name: &str) -> ToolResult {
        let records = data
            .get("records")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        if records.is_empty() {
            return ToolResult::text(format!(
                "✅ {operation} completed: No records found in table \"{table_name}\"."
            ));
        }

        let all_ids = records
            .iter()
            .map(|record| str_field(record, "id"))
            .collect::<Vec<_>>()
            .join(", ");

        let shown = records.len().min(self.detail_items);
        let details = truncate_preview(&Value::Array(records[..shown].to_vec()), self.detail_limit);

        let pagination = match data.get("offset").and_then(Value::as_str) {
            Some(offset) => format!(
                "📄 Pagination: More records available. Use advanced_list_records with offset=\"{offset}\" to get the next page."
            ),
            None => "📄 Pagination: All records shown (no more pages).".to_string(),
        };

        let mut text = format!(
            "✅ {operation} completed: Found {} record(s) in \"{table_name}\"\n\n🔍 All record IDs: {all_ids}\n\n📊 Detailed info for first {shown} records:\n{details}",
            records.len()
        );
        if let Some(steps) = next_steps(operation, Some(base_id), Some(table_name)) {
            text.push_str("\n\n");
            text.push_str(&steps);
        }
        text.push_str("\n\n");
        text.push_str(&pagination);
        ToolResult::text(text)
    }

    // == Table Overview ==
    /// Compact one-line-per-table listing, followed by next-step guidance
    /// when `operation` has any.
    pub fn table_overview(&self, operation: &str, base_id: Option<&str>, tables: &[TableSummary]) -> ToolResult {
        if tables.is_empty() {
            return ToolResult::text(format!("✅ {operation} completed: No tables found in base."));
        }

        let lines = tables
            .iter()
            .map(|t| format!("• {} ({}) - {} fields", t.name, t.id, t.field_count))
            .collect::<Vec<_>>()
            .join("\n");

        let mut text = format!(
            "✅ {operation} completed: Found {} tables\n\n{lines}\n\n💡 Use get_base_schema with table_ids or list_fields for detailed information.",
            tables.len()
        );
        if let Some(steps) = next_steps(operation, base_id, None) {
            text.push_str("\n\n");
            text.push_str(&steps);
        }
        ToolResult::text(text)
    }

    // == Base Summary ==
    /// Lightweight base overview with field and view counts per table.
    pub fn base_summary(&self, base_id: &str, base_name: &str, tables: &[TableSummary]) -> ToolResult {
        let lines = tables
            .iter()
            .map(|t| format!("• {} ({}) - {} fields, {} views", t.name, t.id, t.field_count, t.view_count))
            .collect::<Vec<_>>()
            .join("\n");

        ToolResult::text(format!(
            "✅ Base Summary: {base_name} ({base_id})\n\n📊 Total Tables: {}\n\n📋 Table List:\n{lines}\n\n💡 Tips:\n- Use get_base_schema with table_ids parameter to get detailed schema for specific tables\n- Use list_fields to explore fields in a specific table\n- Use list_records to see data in any table",
            tables.len()
        ))
    }

    // == Schema Cached ==
    /// Cache handle, capped table summary, and chunk retrieval instructions.
    pub fn schema_cached(&self, cache_id: &str, summary: &SchemaSummary) -> ToolResult {
        let mut text = format!(
            "✅ Schema fetched and cached successfully!\n\n📊 Base: {}\n📋 Total tables: {}\n\nTables:\n",
            summary.scope_id, summary.table_count
        );

        for (index, t) in summary.tables.iter().take(self.summary_table_cap).enumerate() {
            text.push_str(&format!(
                "{}. {} ({}) - {} fields, {} views\n",
                index + 1,
                t.name,
                t.id,
                t.field_count,
                t.view_count
            ));
        }
        if summary.tables.len() > self.summary_table_cap {
            text.push_str(&format!(
                "... and {} more tables\n",
                summary.tables.len() - self.summary_table_cap
            ));
        }

        text.push_str(&format!(
            "\n📦 Cache ID: {cache_id}\n\n💡 To retrieve the full schema:\n- Use cache_id=\"{cache_id}\" with chunk_offset=0\n- Continue incrementing chunk_offset to get all chunks\n\nExample: get_base_schema(cache_id=\"{cache_id}\", chunk_offset=0)"
        ));
        ToolResult::text(text)
    }

    // == Schema Chunk ==
    /// One chunk of a cached schema with a pointer to the next one.
    pub fn schema_chunk(&self, chunk: &Chunk) -> ToolResult {
        let footer = if chunk.has_more {
            format!(
                "➡️ Next chunk: use cache_id=\"{}\" with chunk_offset={}",
                chunk.cache_id,
                chunk.index + 1
            )
        } else {
            "✅ Complete schema retrieved".to_string()
        };

        ToolResult::text(format!(
            "📄 Schema Chunk {}/{}\n\n{}\n\n{footer}",
            chunk.index + 1,
            chunk.total,
            chunk.text
        ))
    }

    // == Chunk Unavailable ==
    /// Guidance for a chunk lookup that found nothing.
    pub fn chunk_unavailable(&self, error: &CacheError) -> ToolResult {
        ToolResult::error(format!("❌ get_base_schema failed: {}", error.hint()))
    }

    // == Table Details ==
    /// Minimal per-table detail: counts plus the first ten fields.
    pub fn table_details(&self, tables: &[Value]) -> ToolResult {
        let minimal: Vec<Value> = tables
            .iter()
            .map(|table| {
                let fields = table.get("fields").and_then(Value::as_array);
                let first_fields: Vec<Value> = fields
                    .map(|fields| {
                        fields
                            .iter()
                            .take(10)
                            .map(|f| json!({"id": f.get("id"), "name": f.get("name"), "type": f.get("type")}))
                            .collect()
                    })
                    .unwrap_or_default();

                json!({
                    "id": table.get("id"),
                    "name": table.get("name"),
                    "description": table.get("description"),
                    "fieldCount": fields.map_or(0, Vec::len),
                    "fields": first_fields,
                })
            })
            .collect();

        ToolResult::text(format!(
            "✅ get_base_schema completed: Found {} table(s)\n\n{}",
            minimal.len(),
            truncate_preview(&Value::Array(minimal), self.preview_limit)
        ))
    }

    // == Cached Entries ==
    /// Listing of live cache entries.
    pub fn cached_entries(&self, entries: &[CachedEntryInfo]) -> ToolResult {
        if entries.is_empty() {
            return ToolResult::text(
                "📭 No cached schemas found. Use get_base_schema to cache a schema.",
            );
        }

        let mut text = format!("📦 Cached Schemas ({}):\n\n", entries.len());
        for (index, entry) in entries.iter().enumerate() {
            text.push_str(&format!(
                "{}. Base: {}\n   Cache ID: {}\n   Tables: {}\n   Age: {} minutes\n   Size: {:.1} KB\n\n",
                index + 1,
                entry.scope_id,
                entry.id,
                entry.table_count,
                entry.age_minutes,
                entry.total_size as f64 / 1024.0
            ));
        }
        text.push_str("💡 Use cache_id with get_base_schema to retrieve chunks.");
        ToolResult::text(text)
    }

    // == Schema Failure ==
    /// Failure of a full-schema fetch, with ways to ask for less.
    pub fn schema_failure(&self, error: &ToolError) -> ToolResult {
        ToolResult::error(format!(
            "❌ get_base_schema failed: {error}\n\nTry a smaller request instead:\n1. Use table_ids to fetch specific tables only\n2. Use get_base_summary for a lightweight overview\n3. Use list_fields to explore individual tables"
        ))
    }
}

// == Utility Functions ==
/// Items of a list-shaped response.
fn list_items(data: &Value) -> &[Value] {
    match data {
        Value::Array(items) => items,
        Value::Object(map) => LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

/// Cursor line for responses paged by `cursor` and `mightHaveMore`.
fn cursor_pagination(operation: &str, data: &Value) -> Option<String> {
    let cursor = data.get("cursor").filter(|c| !c.is_null());
    let more = data.get("mightHaveMore").and_then(Value::as_bool);
    if cursor.is_none() && more.is_none() {
        return None;
    }

    let cursor_text = match cursor {
        Some(Value::String(c)) => c.clone(),
        Some(other) => other.to_string(),
        None => "none".to_string(),
    };
    let line = match (more, cursor) {
        (Some(false), _) => format!("📄 Pagination: cursor={cursor_text}, mightHaveMore=false. No more items right now."),
        (_, Some(_)) => format!(
            "📄 Pagination: cursor={cursor_text}, mightHaveMore={}. Use {operation} with cursor=\"{cursor_text}\" to read the next page.",
            more.unwrap_or(true)
        ),
        (_, None) => "📄 Pagination: mightHaveMore=true, but no cursor was returned.".to_string(),
    };
    Some(line)
}

fn item_label(item: &Value, item_type: &str, index: usize) -> String {
    item.get("name")
        .or_else(|| item.get("title"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{item_type} {}", index + 1))
}

fn str_field<'a>(item: &'a Value, key: &str) -> &'a str {
    item.get(key).and_then(Value::as_str).unwrap_or_default()
}
