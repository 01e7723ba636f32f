//! Cache Entry Module
//!
//! Defines a cached payload together with its summary and lazily computed chunks.

use serde::Serialize;
use serde_json::Value;

use crate::cache::chunker::split_into_chunks;

// == Table Summary ==
/// Shallow descriptor of one table in a cached schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub id: String,
    pub name: String,
    pub field_count: usize,
    pub view_count: usize,
}

// == Schema Summary ==
/// Lightweight descriptor of a cached payload, built from its top-level shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    /// Logical resource the payload belongs to (e.g. a base id)
    pub scope_id: String,
    /// Number of entries in the top-level `tables` array
    pub table_count: usize,
    /// Per-table counts, in payload order
    pub tables: Vec<TableSummary>,
}

impl SchemaSummary {
    // == From Payload ==
    /// Builds a summary from the payload's top-level `tables` array.
    ///
    /// Only the first level of each table is inspected (`id`, `name`, and the
    /// lengths of `fields` and `views`). Payloads without `tables` summarize
    /// as zero tables.
    pub fn from_payload(scope_id: &str, payload: &Value) -> Self {
        let tables: Vec<TableSummary> = payload
            .get("tables")
            .and_then(Value::as_array)
            .map(|tables| tables.iter().map(table_summary).collect())
            .unwrap_or_default();

        Self {
            scope_id: scope_id.to_string(),
            table_count: tables.len(),
            tables,
        }
    }
}

fn table_summary(table: &Value) -> TableSummary {
    let text = |key: &str| {
        table
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let count = |key: &str| table.get(key).and_then(Value::as_array).map_or(0, Vec::len);

    TableSummary {
        id: text("id"),
        name: text("name"),
        field_count: count("fields"),
        view_count: count("views"),
    }
}

// == Chunk State ==
/// Chunking progress of an entry. Moves from `Pending` to `Computed` once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkState {
    /// Not chunked yet; no chunking cost has been paid
    Pending,
    /// Chunks computed and memoized
    Computed(Vec<String>),
}

// == Cache Entry ==
/// Represents a single cached payload with its derived artifacts.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Unique cache id
    pub id: String,
    /// Logical resource the payload belongs to
    pub scope_id: String,
    /// The full cached data
    pub payload: Value,
    /// Precomputed shallow summary
    pub summary: SchemaSummary,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Character length of the full serialized payload
    pub total_size: usize,
    chunks: ChunkState,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry. Chunks start out `Pending`.
    pub fn new(id: String, scope_id: &str, payload: Value, created_at: u64, total_size: usize) -> Self {
        let summary = SchemaSummary::from_payload(scope_id, &payload);
        Self {
            id,
            scope_id: scope_id.to_string(),
            payload,
            summary,
            created_at,
            total_size,
            chunks: ChunkState::Pending,
        }
    }

    // == Chunk State ==
    /// Returns the current chunking state.
    pub fn chunk_state(&self) -> &ChunkState {
        &self.chunks
    }

    // == Ensure Chunks ==
    /// Returns the entry's chunks, computing and memoizing them on first use.
    ///
    /// The boolean is `true` when this call performed the computation.
    pub fn ensure_chunks(&mut self, max_chars: usize) -> (&[String], bool) {
        let computed_now = matches!(self.chunks, ChunkState::Pending);
        if computed_now {
            let text = serialize_payload(&self.payload);
            self.chunks = ChunkState::Computed(split_into_chunks(&text, max_chars));
        }

        match &self.chunks {
            ChunkState::Computed(chunks) => (chunks.as_slice(), computed_now),
            ChunkState::Pending => (&[], computed_now),
        }
    }

    // == Age ==
    /// Age of the entry in milliseconds relative to `now_ms`.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at)
    }

    // == Is Expired ==
    /// An entry is expired once its age strictly exceeds `max_age_ms`.
    pub fn is_expired(&self, now_ms: u64, max_age_ms: u64) -> bool {
        self.age_ms(now_ms) > max_age_ms
    }
}

// == Utility Functions ==
/// Canonical text form of a payload: pretty-printed JSON, two-space indent.
pub fn serialize_payload(payload: &Value) -> String {
    // Serializing a `Value` cannot fail: its map keys are always strings
    serde_json::to_string_pretty(payload).unwrap_or_default()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_payload() -> Value {
        json!({
            "tables": [
                {
                    "id": "tblA",
                    "name": "Projects",
                    "fields": [{"id": "fld1"}, {"id": "fld2"}],
                    "views": [{"id": "viw1"}]
                },
                { "id": "tblB", "name": "Tasks" }
            ]
        })
    }

    #[test]
    fn test_summary_counts_top_level_tables() {
        let summary = SchemaSummary::from_payload("app1", &schema_payload());

        assert_eq!(summary.scope_id, "app1");
        assert_eq!(summary.table_count, 2);
        assert_eq!(
            summary.tables[0],
            TableSummary {
                id: "tblA".into(),
                name: "Projects".into(),
                field_count: 2,
                view_count: 1,
            }
        );
        assert_eq!(summary.tables[1].field_count, 0);
        assert_eq!(summary.tables[1].view_count, 0);
    }

    #[test]
    fn test_summary_of_non_schema_payload_is_empty() {
        let summary = SchemaSummary::from_payload("x", &json!([1, 2, 3]));
        assert_eq!(summary.table_count, 0);
        assert!(summary.tables.is_empty());
    }

    #[test]
    fn test_new_entry_has_pending_chunks() {
        let entry = CacheEntry::new("app1-1".into(), "app1", schema_payload(), 1, 10);
        assert_eq!(entry.chunk_state(), &ChunkState::Pending);
    }

    #[test]
    fn test_ensure_chunks_computes_once() {
        let payload = schema_payload();
        let text = serialize_payload(&payload);
        let mut entry = CacheEntry::new("app1-1".into(), "app1", payload, 1, text.len());

        let (chunks, computed) = entry.ensure_chunks(40);
        assert!(computed);
        assert_eq!(chunks.join("\n"), text);

        let (_, computed_again) = entry.ensure_chunks(40);
        assert!(!computed_again);
        assert!(matches!(entry.chunk_state(), ChunkState::Computed(_)));
    }

    #[test]
    fn test_expiry_is_strictly_after_max_age() {
        let entry = CacheEntry::new("a-0".into(), "a", json!({}), 1_000, 2);
        assert!(!entry.is_expired(1_000 + 500, 500));
        assert!(entry.is_expired(1_000 + 501, 500));
    }

    #[test]
    fn test_age_never_underflows() {
        let entry = CacheEntry::new("a-0".into(), "a", json!({}), 5_000, 2);
        assert_eq!(entry.age_ms(1_000), 0);
    }
}
