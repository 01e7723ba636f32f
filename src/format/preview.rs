//! Preview truncation.
//!
//! A preview is a lossy rendering: what it drops cannot be fetched later.

use serde_json::Value;

/// Default preview limit in characters
pub const DEFAULT_PREVIEW_LIMIT: usize = 5_000;

/// Number of array items kept when an array preview is truncated
const PREVIEW_ITEMS: usize = 3;

// == Truncate Preview ==
/// Pretty-prints `data`, shortening it when the text exceeds `limit` characters.
///
/// Arrays longer than three items keep the first three and note how many were
/// dropped. Anything else is cut at `limit` characters with a notice appended.
pub fn truncate_preview(data: &Value, limit: usize) -> String {
    let text = pretty(data);
    if text.chars().count() <= limit {
        return text;
    }

    if let Value::Array(items) = data {
        if items.len() > PREVIEW_ITEMS {
            let kept = pretty(&Value::Array(items[..PREVIEW_ITEMS].to_vec()));
            let open = kept.strip_suffix(']').unwrap_or(&kept).trim_end();
            return format!(
                "{open}\n  ... ({} more items truncated)\n]",
                items.len() - PREVIEW_ITEMS
            );
        }
    }

    let cut = text
        .char_indices()
        .nth(limit)
        .map_or(text.len(), |(idx, _)| idx);
    format!("{}\n... (response truncated due to size)", &text[..cut])
}

fn pretty(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}
