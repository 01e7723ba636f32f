//! Next-step hints appended to list and record results.

/// Suggested follow-up tool calls after `operation`.
///
/// Returns `None` for operations without a natural next step.
pub fn next_steps(operation: &str, base_id: Option<&str>, table_name: Option<&str>) -> Option<String> {
    let base = base_id.unwrap_or("<base_id>");
    let table = table_name.unwrap_or("<table_name>");

    let steps: Vec<String> = match operation {
        "list_bases" => vec![
            "Use list_tables with base_id=\"<base_id>\" to see tables in each base".into(),
            "Use get_base_schema with base_id=\"<base_id>\" for complete base structure".into(),
        ],
        "list_tables" => vec![
            format!("Use list_fields with base_id=\"{base}\" and table_id=\"<table_id>\" to see fields"),
            format!("Use list_records with base_id=\"{base}\" and table_name=\"<table_name>\" to see data"),
            format!("Use get_base_schema with base_id=\"{base}\" for complete schema"),
        ],
        "list_fields" => vec![
            "Use create_field to add new fields".into(),
            "Use update_field to modify existing fields".into(),
            "Use list_records to see how these fields are used".into(),
        ],
        "list_views" => vec![
            format!("Use get_view with base_id=\"{base}\" and view_id=\"<view_id>\" for a view's configuration"),
            "Use advanced_list_records with view=\"<view name>\" to read records through a view".into(),
        ],
        "list_webhooks" => vec![
            format!("Use get_webhook_payloads with base_id=\"{base}\" and webhook_id=\"<webhook_id>\" to see notifications"),
            "Use update_webhook or delete_webhook to manage a webhook".into(),
        ],
        "get_webhook_payloads" => vec![
            "Pass the returned cursor to get_webhook_payloads to continue reading".into(),
        ],
        "list_records" | "search_records" | "advanced_list_records" => vec![
            format!("Use get_record with base_id=\"{base}\", table_name=\"{table}\", record_id=\"<record_id>\" for full details"),
            "Use search_records to filter by field values".into(),
            "Use update_record or delete_record to modify data".into(),
        ],
        _ => return None,
    };

    let mut text = String::from("📋 Next Steps:");
    for step in steps {
        text.push_str("\n- ");
        text.push_str(&step);
    }
    Some(text)
}
