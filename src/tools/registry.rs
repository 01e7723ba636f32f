//! Tool catalogue: names, descriptions and JSON input schemas.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// One advertised tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolDefinition {
    fn new(name: &'static str, description: &'static str, input_schema: Value) -> Self {
        Self {
            name,
            description,
            input_schema,
        }
    }
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

fn object(description: &str) -> Value {
    json!({ "type": "object", "description": description })
}

fn string_array(description: &str) -> Value {
    json!({ "type": "array", "description": description, "items": { "type": "string" } })
}

/// Object schema from `(name, property)` pairs and the required names.
fn schema(properties: Vec<(&str, Value)>, required: &[&str]) -> Value {
    let properties: Map<String, Value> = properties
        .into_iter()
        .map(|(name, property)| (name.to_string(), property))
        .collect();
    json!({ "type": "object", "properties": properties, "required": required })
}

fn base_id() -> (&'static str, Value) {
    ("base_id", string("ID of the base"))
}

fn table_id() -> (&'static str, Value) {
    ("table_id", string("ID of the table"))
}

fn table_name() -> (&'static str, Value) {
    ("table_name", string("Name of the table"))
}

fn field_input() -> Value {
    schema(
        vec![
            ("name", string("Name of the field")),
            ("type", string("Type of the field (e.g., singleLineText, multilineText, number, etc.)")),
            ("description", string("Description of the field")),
            ("options", object("Field-specific options")),
        ],
        &["name", "type"],
    )
}

fn view_sort_fields() -> Value {
    json!({
        "type": "array",
        "description": "Sort configuration for view",
        "items": schema(
            vec![
                ("field_id", string("Field ID to sort by")),
                ("direction", json!({ "type": "string", "enum": ["asc", "desc"], "description": "Sort direction" })),
            ],
            &["field_id"],
        ),
    })
}

/// Every tool the server exposes, in advertised order.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("list_bases", "List all accessible Airtable bases", schema(vec![], &[])),
        ToolDefinition::new("list_tables", "List all tables in a base", schema(vec![base_id()], &["base_id"])),
        ToolDefinition::new(
            "create_table",
            "Create a new table in a base",
            schema(
                vec![
                    base_id(),
                    ("table_name", string("Name of the new table")),
                    ("description", string("Description of the table")),
                    ("fields", json!({ "type": "array", "description": "Initial fields for the table", "items": field_input() })),
                ],
                &["base_id", "table_name"],
            ),
        ),
        ToolDefinition::new(
            "update_table",
            "Update a table's schema",
            schema(
                vec![
                    base_id(),
                    ("table_id", string("ID of the table to update")),
                    ("name", string("New name for the table")),
                    ("description", string("New description for the table")),
                ],
                &["base_id", "table_id"],
            ),
        ),
        ToolDefinition::new(
            "create_field",
            "Create a new field in a table",
            schema(vec![base_id(), table_id(), ("field", field_input())], &["base_id", "table_id", "field"]),
        ),
        ToolDefinition::new(
            "update_field",
            "Update a field in a table",
            schema(
                vec![
                    base_id(),
                    table_id(),
                    ("field_id", string("ID of the field to update")),
                    (
                        "updates",
                        schema(
                            vec![
                                ("name", string("New name for the field")),
                                ("description", string("New description for the field")),
                                ("options", object("New field-specific options")),
                            ],
                            &[],
                        ),
                    ),
                ],
                &["base_id", "table_id", "field_id", "updates"],
            ),
        ),
        ToolDefinition::new(
            "list_records",
            "List records in a table",
            schema(
                vec![base_id(), table_name(), ("max_records", number("Maximum number of records to return"))],
                &["base_id", "table_name"],
            ),
        ),
        ToolDefinition::new(
            "create_record",
            "Create a new record in a table",
            schema(
                vec![base_id(), table_name(), ("fields", object("Record fields as key-value pairs"))],
                &["base_id", "table_name", "fields"],
            ),
        ),
        ToolDefinition::new(
            "update_record",
            "Update an existing record in a table",
            schema(
                vec![
                    base_id(),
                    table_name(),
                    ("record_id", string("ID of the record to update")),
                    ("fields", object("Record fields to update as key-value pairs")),
                ],
                &["base_id", "table_name", "record_id", "fields"],
            ),
        ),
        ToolDefinition::new(
            "delete_record",
            "Delete a record from a table",
            schema(
                vec![base_id(), table_name(), ("record_id", string("ID of the record to delete"))],
                &["base_id", "table_name", "record_id"],
            ),
        ),
        ToolDefinition::new(
            "search_records",
            "Search for records in a table",
            schema(
                vec![
                    base_id(),
                    table_name(),
                    ("field_name", string("Name of the field to search in")),
                    ("value", string("Value to search for")),
                ],
                &["base_id", "table_name", "field_name", "value"],
            ),
        ),
        ToolDefinition::new(
            "get_record",
            "Get a single record by its ID",
            schema(
                vec![base_id(), table_name(), ("record_id", string("ID of the record to retrieve"))],
                &["base_id", "table_name", "record_id"],
            ),
        ),
        ToolDefinition::new(
            "list_cached_schemas",
            "List all cached schemas with their cache IDs and metadata",
            schema(vec![], &[]),
        ),
        ToolDefinition::new(
            "get_base_summary",
            "Get a lightweight summary of all tables in a base (names, IDs, and field counts only)",
            schema(vec![base_id()], &["base_id"]),
        ),
        ToolDefinition::new(
            "get_base_schema",
            "Get complete base schema including all tables and fields. For large schemas, returns a cache ID to fetch data in chunks.",
            schema(
                vec![
                    base_id(),
                    ("cache_id", string("Cache ID from a previous fetch (use with chunk_offset)")),
                    ("chunk_offset", number("Chunk number to retrieve (0-based, use with cache_id)")),
                    (
                        "table_ids",
                        string_array("Optional array of specific table IDs to include in the schema. If not provided, all tables will be included."),
                    ),
                    ("use_cache", boolean("Use caching for large schemas (default: true for full base schemas)")),
                ],
                &[],
            ),
        ),
        ToolDefinition::new(
            "delete_base",
            "Delete a base (Enterprise only)",
            schema(vec![("base_id", string("ID of the base to delete"))], &["base_id"]),
        ),
        ToolDefinition::new(
            "batch_create_records",
            "Create multiple records in a single request",
            schema(
                vec![
                    base_id(),
                    table_name(),
                    (
                        "records",
                        json!({
                            "type": "array",
                            "description": "Array of records to create",
                            "items": schema(vec![("fields", object("Record fields as key-value pairs"))], &["fields"]),
                        }),
                    ),
                    ("typecast", boolean("Automatically convert field types")),
                ],
                &["base_id", "table_name", "records"],
            ),
        ),
        ToolDefinition::new(
            "batch_update_records",
            "Update multiple records in a single request",
            schema(
                vec![
                    base_id(),
                    table_name(),
                    (
                        "records",
                        json!({
                            "type": "array",
                            "description": "Array of records to update",
                            "items": schema(
                                vec![("id", string("Record ID")), ("fields", object("Record fields to update"))],
                                &["id", "fields"],
                            ),
                        }),
                    ),
                    ("typecast", boolean("Automatically convert field types")),
                ],
                &["base_id", "table_name", "records"],
            ),
        ),
        ToolDefinition::new(
            "batch_delete_records",
            "Delete multiple records in a single request",
            schema(
                vec![base_id(), table_name(), ("record_ids", string_array("Array of record IDs to delete"))],
                &["base_id", "table_name", "record_ids"],
            ),
        ),
        ToolDefinition::new(
            "advanced_list_records",
            "List records with advanced filtering, sorting, and pagination",
            schema(
                vec![
                    base_id(),
                    table_name(),
                    ("filter_by_formula", string("Airtable formula to filter records")),
                    (
                        "sort",
                        json!({
                            "type": "array",
                            "description": "Sort configuration",
                            "items": schema(
                                vec![
                                    ("field", string("Field name to sort by")),
                                    ("direction", json!({ "type": "string", "enum": ["asc", "desc"], "description": "Sort direction" })),
                                ],
                                &["field"],
                            ),
                        }),
                    ),
                    ("max_records", number("Maximum number of records to return")),
                    ("page_size", number("Number of records per page (max 100)")),
                    ("view", string("Name or ID of view to use")),
                    ("fields", string_array("Specific fields to return")),
                    ("cell_format", json!({ "type": "string", "enum": ["json", "string"], "description": "Format for cell values" })),
                    ("time_zone", string("Time zone for date/time fields")),
                    ("user_locale", string("User locale for formatting")),
                    ("offset", string("Pagination offset token")),
                ],
                &["base_id", "table_name"],
            ),
        ),
        ToolDefinition::new(
            "list_views",
            "List all views in a table",
            schema(vec![base_id(), table_id()], &["base_id", "table_id"]),
        ),
        ToolDefinition::new(
            "get_view",
            "Get view configuration",
            schema(
                vec![base_id(), table_id(), ("view_id", string("ID of the view"))],
                &["base_id", "table_id", "view_id"],
            ),
        ),
        ToolDefinition::new(
            "create_view",
            "Create a new view in a table",
            schema(
                vec![
                    base_id(),
                    table_id(),
                    (
                        "view",
                        schema(
                            vec![
                                ("name", string("Name of the view")),
                                (
                                    "type",
                                    json!({
                                        "type": "string",
                                        "enum": ["grid", "form", "calendar", "gallery", "kanban", "timeline", "gantt"],
                                        "description": "Type of view",
                                    }),
                                ),
                                ("visible_field_ids", string_array("Array of field IDs to show in view")),
                                ("filter_by_formula", string("Formula to filter records in view")),
                                ("sort_fields", view_sort_fields()),
                            ],
                            &["name", "type"],
                        ),
                    ),
                ],
                &["base_id", "table_id", "view"],
            ),
        ),
        ToolDefinition::new(
            "update_view",
            "Update an existing view",
            schema(
                vec![
                    base_id(),
                    table_id(),
                    ("view_id", string("ID of the view to update")),
                    (
                        "updates",
                        schema(
                            vec![
                                ("name", string("New name for the view")),
                                ("visible_field_ids", string_array("Array of field IDs to show in view")),
                                ("filter_by_formula", string("Formula to filter records in view")),
                                ("sort_fields", view_sort_fields()),
                            ],
                            &[],
                        ),
                    ),
                ],
                &["base_id", "table_id", "view_id", "updates"],
            ),
        ),
        ToolDefinition::new(
            "delete_view",
            "Delete a view from a table",
            schema(
                vec![base_id(), table_id(), ("view_id", string("ID of the view to delete"))],
                &["base_id", "table_id", "view_id"],
            ),
        ),
        ToolDefinition::new(
            "list_fields",
            "List all fields in a table",
            schema(vec![base_id(), table_id()], &["base_id", "table_id"]),
        ),
        ToolDefinition::new(
            "delete_field",
            "Delete a field from a table",
            schema(
                vec![base_id(), table_id(), ("field_id", string("ID of the field to delete"))],
                &["base_id", "table_id", "field_id"],
            ),
        ),
        ToolDefinition::new("list_webhooks", "List all webhooks for a base", schema(vec![base_id()], &["base_id"])),
        ToolDefinition::new(
            "create_webhook",
            "Create a new webhook for real-time notifications",
            schema(
                vec![
                    base_id(),
                    ("notification_url", string("URL to receive webhook notifications")),
                    (
                        "specification",
                        json!({
                            "type": "object",
                            "properties": {
                                "options": {
                                    "type": "object",
                                    "properties": {
                                        "filters": {
                                            "type": "object",
                                            "properties": {
                                                "data_types": {
                                                    "type": "array",
                                                    "description": "Types of data changes to monitor",
                                                    "items": { "type": "string", "enum": ["tableData", "tableSchema", "tableMetadata"] },
                                                },
                                                "record_change_scope": string("Table ID to monitor for record changes"),
                                            },
                                        },
                                    },
                                },
                            },
                        }),
                    ),
                ],
                &["base_id", "notification_url", "specification"],
            ),
        ),
        ToolDefinition::new(
            "update_webhook",
            "Update an existing webhook",
            schema(
                vec![
                    base_id(),
                    ("webhook_id", string("ID of the webhook to update")),
                    (
                        "updates",
                        schema(
                            vec![
                                ("notification_url", string("New URL to receive webhook notifications")),
                                ("specification", object("Updated webhook specification")),
                            ],
                            &[],
                        ),
                    ),
                ],
                &["base_id", "webhook_id", "updates"],
            ),
        ),
        ToolDefinition::new(
            "delete_webhook",
            "Delete a webhook",
            schema(
                vec![base_id(), ("webhook_id", string("ID of the webhook to delete"))],
                &["base_id", "webhook_id"],
            ),
        ),
        ToolDefinition::new(
            "get_webhook_payloads",
            "Get webhook notification history",
            schema(
                vec![
                    base_id(),
                    ("webhook_id", string("ID of the webhook")),
                    ("cursor", string("Pagination cursor")),
                    ("limit", number("Number of payloads to return")),
                ],
                &["base_id", "webhook_id"],
            ),
        ),
    ]
}

/// Tool definitions as wire values (`name`, `description`, `inputSchema`).
pub fn tool_definitions_json() -> Vec<Value> {
    tool_definitions()
        .into_iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema,
            })
        })
        .collect()
}
