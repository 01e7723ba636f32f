//! End-to-end tool dispatch against a fake remote API.

mod common;

use std::sync::Arc;

use airtable_mcp::cache::{serialize_payload, ManualClock};
use reqwest::Method;
use serde_json::json;

use common::{args, schema_payload, test_state, FakeApi};

// == Schema Caching ==

#[tokio::test]
async fn test_full_schema_is_cached_and_served_in_chunks() {
    let api = FakeApi::new();
    let payload = schema_payload(14, 12);
    api.respond("GET", "/meta/bases/appBIG/tables", payload.clone());
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let state = test_state(api.clone(), clock, 2_000);

    let result = state
        .dispatcher
        .call("get_base_schema", &args(json!({"base_id": "appBIG"})))
        .await;
    let text = result.joined_text();

    assert!(!result.is_error);
    assert!(text.contains("Total tables: 14"));
    assert!(text.contains("... and 4 more tables"));
    assert!(text.contains("Cache ID: appBIG-1700000000000"));

    // Walk every chunk and reassemble the payload
    let mut pieces = Vec::new();
    let mut offset = 0;
    loop {
        let result = state
            .dispatcher
            .call(
                "get_base_schema",
                &args(json!({"cache_id": "appBIG-1700000000000", "chunk_offset": offset})),
            )
            .await;
        assert!(!result.is_error, "chunk {offset} failed: {}", result.joined_text());
        let text = result.joined_text();

        let body_start = text.find("\n\n").unwrap() + 2;
        let body_end = text.rfind("\n\n").unwrap();
        pieces.push(text[body_start..body_end].to_string());

        if text.ends_with("Complete schema retrieved") {
            break;
        }
        assert!(text.contains(&format!("chunk_offset={}", offset + 1)));
        offset += 1;
    }

    assert!(pieces.len() > 1);
    assert_eq!(pieces.join("\n"), serialize_payload(&payload));

    let stats = state.cache.read().await.stats();
    assert_eq!(stats.chunk_computations, 1);
    assert_eq!(stats.hits as usize, pieces.len());
}

#[tokio::test]
async fn test_cache_id_without_offset_returns_first_chunk() {
    let api = FakeApi::new();
    api.respond("GET", "/meta/bases/app1/tables", schema_payload(2, 2));
    let state = test_state(api, Arc::new(ManualClock::new(5)), 15_000);

    state.dispatcher.call("get_base_schema", &args(json!({"base_id": "app1"}))).await;
    let result = state
        .dispatcher
        .call("get_base_schema", &args(json!({"cache_id": "app1-5"})))
        .await;

    assert!(result.joined_text().starts_with("📄 Schema Chunk 1/1"));
}

#[tokio::test]
async fn test_unknown_cache_id_gives_guidance() {
    let api = FakeApi::new();
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let result = state
        .dispatcher
        .call("get_base_schema", &args(json!({"cache_id": "app1-999", "chunk_offset": 0})))
        .await;

    assert!(result.is_error);
    assert!(result.joined_text().contains("fetch the schema first"));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_out_of_range_offset_lists_valid_offsets() {
    let api = FakeApi::new();
    api.respond("GET", "/meta/bases/app1/tables", schema_payload(1, 1));
    let state = test_state(api, Arc::new(ManualClock::new(7)), 15_000);

    state.dispatcher.call("get_base_schema", &args(json!({"base_id": "app1"}))).await;
    let result = state
        .dispatcher
        .call("get_base_schema", &args(json!({"cache_id": "app1-7", "chunk_offset": 4})))
        .await;

    assert!(result.is_error);
    assert!(result.joined_text().contains("Valid offsets are 0 to 0"));
}

#[tokio::test]
async fn test_expired_schema_is_not_served() {
    let api = FakeApi::new();
    api.respond("GET", "/meta/bases/app1/tables", schema_payload(1, 1));
    let clock = Arc::new(ManualClock::new(0));
    let state = test_state(api, clock.clone(), 15_000);

    state.dispatcher.call("get_base_schema", &args(json!({"base_id": "app1"}))).await;
    clock.advance_minutes(31);

    let listing = state.dispatcher.call("list_cached_schemas", &args(json!({}))).await;
    assert!(listing.joined_text().contains("No cached schemas"));

    let result = state
        .dispatcher
        .call("get_base_schema", &args(json!({"cache_id": "app1-0", "chunk_offset": 0})))
        .await;
    assert!(result.is_error);
    assert!(state.cache.read().await.is_empty());
}

#[tokio::test]
async fn test_list_cached_schemas_reports_entries() {
    let api = FakeApi::new();
    api.respond("GET", "/meta/bases/app1/tables", schema_payload(3, 2));
    let clock = Arc::new(ManualClock::new(0));
    let state = test_state(api, clock.clone(), 15_000);

    state.dispatcher.call("get_base_schema", &args(json!({"base_id": "app1"}))).await;
    clock.advance_minutes(4);

    let text = state
        .dispatcher
        .call("list_cached_schemas", &args(json!({})))
        .await
        .joined_text();
    assert!(text.contains("Cached Schemas (1)"));
    assert!(text.contains("Cache ID: app1-0"));
    assert!(text.contains("Tables: 3"));
    assert!(text.contains("Age: 4 minutes"));
}

#[tokio::test]
async fn test_table_ids_fetch_minimal_detail_and_skip_failures() {
    let api = FakeApi::new();
    let payload = schema_payload(1, 15);
    api.respond("GET", "/meta/bases/app1/tables/tbl0", payload["tables"][0].clone());
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let result = state
        .dispatcher
        .call("get_base_schema", &args(json!({"base_id": "app1", "table_ids": ["tbl0", "tblMissing"]})))
        .await;
    let text = result.joined_text();

    assert!(!result.is_error);
    assert!(text.contains("Found 1 table(s)"));
    assert!(text.contains("\"fieldCount\": 15"));
    assert!(!text.contains("fld0x10"));
    assert_eq!(api.requests().len(), 2);
    assert!(state.cache.read().await.is_empty());
}

#[tokio::test]
async fn test_use_cache_false_lists_tables_without_caching() {
    let api = FakeApi::new();
    api.respond("GET", "/meta/bases/app1/tables", schema_payload(2, 3));
    let state = test_state(api, Arc::new(ManualClock::new(0)), 15_000);

    let text = state
        .dispatcher
        .call("get_base_schema", &args(json!({"base_id": "app1", "use_cache": false})))
        .await
        .joined_text();

    assert!(text.contains("Table 1 (tbl1) - 3 fields"));
    assert!(state.cache.read().await.is_empty());
}

#[tokio::test]
async fn test_schema_fetch_failure_suggests_smaller_requests() {
    let api = FakeApi::new();
    api.fail("GET", "/meta/bases/app1/tables", 413, "Response too large");
    let state = test_state(api, Arc::new(ManualClock::new(0)), 15_000);

    let result = state.dispatcher.call("get_base_schema", &args(json!({"base_id": "app1"}))).await;

    assert!(result.is_error);
    let text = result.joined_text();
    assert!(text.contains("Response too large"));
    assert!(text.contains("table_ids"));
}

// == Records ==

#[tokio::test]
async fn test_list_records_surfaces_pagination_token() {
    let api = FakeApi::new();
    api.respond(
        "GET",
        "/app1/Tasks",
        json!({
            "records": [
                {"id": "rec1", "fields": {"Name": "a"}},
                {"id": "rec2", "fields": {"Name": "b"}},
                {"id": "rec3", "fields": {"Name": "c"}},
                {"id": "rec4", "fields": {"Name": "d"}}
            ],
            "offset": "itrNEXT/rec4"
        }),
    );
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let text = state
        .dispatcher
        .call("list_records", &args(json!({"base_id": "app1", "table_name": "Tasks", "max_records": 4})))
        .await
        .joined_text();

    assert!(text.contains("rec1, rec2, rec3, rec4"));
    assert!(text.contains("offset=\"itrNEXT/rec4\""));
    assert_eq!(api.last_request().query_value("maxRecords"), Some("4"));
}

#[tokio::test]
async fn test_advanced_list_records_encodes_query() {
    let api = FakeApi::new();
    api.respond("GET", "/app1/Tasks", json!({"records": []}));
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    state
        .dispatcher
        .call(
            "advanced_list_records",
            &args(json!({
                "base_id": "app1",
                "table_name": "Tasks",
                "filter_by_formula": "{Done}",
                "sort": [{"field": "Name", "direction": "desc"}, {"field": "Due"}],
                "fields": ["Name", "Due"],
                "page_size": 50,
                "cell_format": "json",
                "offset": "itr1"
            })),
        )
        .await;

    let request = api.last_request();
    let query: Vec<(&str, &str)> = request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(
        query,
        vec![
            ("filterByFormula", "{Done}"),
            ("sort[0][field]", "Name"),
            ("sort[0][direction]", "desc"),
            ("sort[1][field]", "Due"),
            ("pageSize", "50"),
            ("fields[]", "Name"),
            ("fields[]", "Due"),
            ("cellFormat", "json"),
            ("offset", "itr1"),
        ]
    );
}

#[tokio::test]
async fn test_search_records_builds_formula() {
    let api = FakeApi::new();
    api.respond("GET", "/app1/People", json!({"records": [{"id": "rec9"}]}));
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let text = state
        .dispatcher
        .call(
            "search_records",
            &args(json!({"base_id": "app1", "table_name": "People", "field_name": "Name", "value": "Ada"})),
        )
        .await
        .joined_text();

    assert!(text.contains("All records shown"));
    assert_eq!(api.last_request().query_value("filterByFormula"), Some("{Name} = \"Ada\""));
}

#[tokio::test]
async fn test_batch_delete_sends_record_ids() {
    let api = FakeApi::new();
    api.respond("DELETE", "/app1/Tasks", json!({"records": [{"id": "rec1", "deleted": true}]}));
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let result = state
        .dispatcher
        .call(
            "batch_delete_records",
            &args(json!({"base_id": "app1", "table_name": "Tasks", "record_ids": ["rec1", "rec2"]})),
        )
        .await;

    assert!(result.joined_text().starts_with("✅ batch_delete_records completed successfully"));
    let request = api.last_request();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.query.len(), 2);
    assert!(request.query.iter().all(|(k, _)| k == "records[]"));
}

#[tokio::test]
async fn test_table_name_stays_one_path_segment() {
    let api = FakeApi::new();
    api.respond("GET", "/app1/Q&A #1", json!({"records": [{"id": "rec1", "fields": {}}]}));
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let result = state
        .dispatcher
        .call("list_records", &args(json!({"base_id": "app1", "table_name": "Q&A #1"})))
        .await;

    assert!(!result.is_error, "{}", result.joined_text());
    assert_eq!(api.last_request().segments, vec!["app1", "Q&A #1"]);
}

// == Lists ==

#[tokio::test]
async fn test_list_tables_suggests_next_steps() {
    let api = FakeApi::new();
    api.respond("GET", "/meta/bases/app1/tables", schema_payload(2, 3));
    let state = test_state(api, Arc::new(ManualClock::new(0)), 15_000);

    let text = state
        .dispatcher
        .call("list_tables", &args(json!({"base_id": "app1"})))
        .await
        .joined_text();

    assert!(text.contains("Found 2 tables"));
    assert!(text.contains("Next Steps"));
    assert!(text.contains("Use list_records with base_id=\"app1\""));
}

#[tokio::test]
async fn test_webhook_payloads_surface_cursor() {
    let api = FakeApi::new();
    api.respond(
        "GET",
        "/bases/app1/webhooks/ach1/payloads",
        json!({
            "payloads": [{"timestamp": "2024-01-01T00:00:00.000Z", "baseTransactionNumber": 4}],
            "cursor": 5,
            "mightHaveMore": true
        }),
    );
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let text = state
        .dispatcher
        .call("get_webhook_payloads", &args(json!({"base_id": "app1", "webhook_id": "ach1"})))
        .await
        .joined_text();

    assert!(text.contains("All payloads: payload 1\n"));
    assert!(text.contains("cursor=5, mightHaveMore=true"));

    // the returned cursor is accepted back as a number or a string
    for cursor in [json!(5), json!("5")] {
        state
            .dispatcher
            .call(
                "get_webhook_payloads",
                &args(json!({"base_id": "app1", "webhook_id": "ach1", "cursor": cursor})),
            )
            .await;
        assert_eq!(api.last_request().query_value("cursor"), Some("5"));
    }
}

#[tokio::test]
async fn test_wrapped_view_list_is_enumerated() {
    let api = FakeApi::new();
    api.respond(
        "GET",
        "/meta/bases/app1/tables/tbl1/views",
        json!({"views": [{"id": "viw1", "name": "Grid"}, {"id": "viw2", "name": "Kanban"}]}),
    );
    let state = test_state(api, Arc::new(ManualClock::new(0)), 15_000);

    let text = state
        .dispatcher
        .call("list_views", &args(json!({"base_id": "app1", "table_id": "tbl1"})))
        .await
        .joined_text();

    assert!(text.contains("Found 2 view(s)"));
    assert!(text.contains("Grid (viw1), Kanban (viw2)"));
}

#[tokio::test]
async fn test_get_base_summary_falls_back_to_unknown_name() {
    let api = FakeApi::new();
    api.respond("GET", "/meta/bases/app1/tables", schema_payload(2, 4));
    let state = test_state(api, Arc::new(ManualClock::new(0)), 15_000);

    let text = state
        .dispatcher
        .call("get_base_summary", &args(json!({"base_id": "app1"})))
        .await
        .joined_text();

    assert!(text.contains("Base Summary: Unknown Base (app1)"));
    assert!(text.contains("Table 0 (tbl0) - 4 fields, 1 views"));
}

// == Failures ==

#[tokio::test]
async fn test_invalid_field_options_rejected_before_network() {
    let api = FakeApi::new();
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let result = state
        .dispatcher
        .call(
            "create_field",
            &args(json!({
                "base_id": "app1",
                "table_id": "tbl1",
                "field": {"name": "Score", "type": "rating", "options": {"max": 50}}
            })),
        )
        .await;

    assert!(result.is_error);
    assert!(result.joined_text().starts_with("❌ create_field failed"));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_create_field_fills_default_options() {
    let api = FakeApi::new();
    api.respond("POST", "/meta/bases/app1/tables/tbl1/fields", json!({"id": "fldNEW"}));
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    state
        .dispatcher
        .call(
            "create_field",
            &args(json!({"base_id": "app1", "table_id": "tbl1", "field": {"name": "Amount", "type": "number"}})),
        )
        .await;

    let body = api.last_request().body.unwrap();
    assert_eq!(body["options"]["precision"], 0);
}

#[tokio::test]
async fn test_remote_error_message_is_rendered() {
    let api = FakeApi::new();
    api.fail("GET", "/app1/Nope/rec1", 404, "Could not find table Nope");
    let state = test_state(api, Arc::new(ManualClock::new(0)), 15_000);

    let result = state
        .dispatcher
        .call("get_record", &args(json!({"base_id": "app1", "table_name": "Nope", "record_id": "rec1"})))
        .await;

    assert!(result.is_error);
    assert_eq!(result.joined_text(), "❌ get_record failed: Could not find table Nope");
}

#[tokio::test]
async fn test_missing_argument_and_unknown_tool() {
    let api = FakeApi::new();
    let state = test_state(api.clone(), Arc::new(ManualClock::new(0)), 15_000);

    let missing = state.dispatcher.call("list_tables", &args(json!({}))).await;
    assert!(missing.is_error);
    assert!(missing.joined_text().contains("base_id is required"));

    let unknown = state.dispatcher.call("drop_everything", &args(json!({}))).await;
    assert!(unknown.is_error);
    assert!(unknown.joined_text().contains("Unknown tool: drop_everything"));

    assert!(api.requests().is_empty());
}
