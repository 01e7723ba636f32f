//! Tool Dispatcher
//!
//! Maps each tool name to its remote endpoint, validates arguments, and
//! renders the outcome through the response formatter. Every failure becomes
//! an error-flagged `ToolResult`; nothing here is fatal to the server.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::airtable::{prepare_field, ApiRequest, FieldDefinition, TabularApi};
use crate::cache::{SchemaSummary, SharedCache};
use crate::error::{CacheError, Result, ToolError};
use crate::format::ResponseFormatter;
use crate::models::ToolResult;
use crate::tools::{CallTracker, ToolArgs};

// == Tool Dispatcher ==
pub struct ToolDispatcher {
    api: Arc<dyn TabularApi>,
    cache: SharedCache,
    formatter: ResponseFormatter,
    tracker: CallTracker,
}

impl ToolDispatcher {
    pub fn new(api: Arc<dyn TabularApi>, cache: SharedCache, formatter: ResponseFormatter) -> Self {
        Self {
            api,
            cache,
            formatter,
            tracker: CallTracker::new(),
        }
    }

    /// Shared cache handle, also held by the sweep task.
    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    // == Call ==
    /// Runs one tool call to completion.
    pub async fn call(&self, name: &str, arguments: &Map<String, Value>) -> ToolResult {
        let count = self.tracker.record(name, arguments).await;
        info!(tool = name, count, "Tool called");

        match self.execute(name, ToolArgs::new(arguments)).await {
            Ok(result) => result,
            Err(err) => {
                warn!(tool = name, error = %err, "Tool call failed");
                self.formatter.failure(name, &err)
            }
        }
    }

    async fn execute(&self, name: &str, args: ToolArgs<'_>) -> Result<ToolResult> {
        match name {
            "list_bases" => self.list_bases().await,
            "list_tables" => self.list_tables(args).await,
            "create_table" => self.create_table(args).await,
            "update_table" => self.update_table(args).await,
            "create_field" => self.create_field(args).await,
            "update_field" => self.update_field(args).await,
            "list_fields" => self.list_fields(args).await,
            "delete_field" => self.delete_field(args).await,
            "list_records" => self.list_records(args).await,
            "create_record" => self.create_record(args).await,
            "update_record" => self.update_record(args).await,
            "delete_record" => self.delete_record(args).await,
            "search_records" => self.search_records(args).await,
            "get_record" => self.get_record(args).await,
            "list_cached_schemas" => self.list_cached_schemas().await,
            "get_base_summary" => self.get_base_summary(args).await,
            "get_base_schema" => self.get_base_schema(args).await,
            "delete_base" => self.delete_base(args).await,
            "batch_create_records" => self.batch_create_records(args).await,
            "batch_update_records" => self.batch_update_records(args).await,
            "batch_delete_records" => self.batch_delete_records(args).await,
            "advanced_list_records" => self.advanced_list_records(args).await,
            "list_views" => self.list_views(args).await,
            "get_view" => self.get_view(args).await,
            "create_view" => self.create_view(args).await,
            "update_view" => self.update_view(args).await,
            "delete_view" => self.delete_view(args).await,
            "list_webhooks" => self.list_webhooks(args).await,
            "create_webhook" => self.create_webhook(args).await,
            "update_webhook" => self.update_webhook(args).await,
            "delete_webhook" => self.delete_webhook(args).await,
            "get_webhook_payloads" => self.get_webhook_payloads(args).await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }

    /// Sends a request and wraps the response as a plain success.
    async fn send_success(&self, operation: &str, request: ApiRequest) -> Result<ToolResult> {
        let data = self.api.send(request).await?;
        Ok(self.formatter.success(operation, &data))
    }

    // == Bases and Tables ==
    async fn list_bases(&self) -> Result<ToolResult> {
        let data = self.api.send(ApiRequest::get(["meta", "bases"])).await?;
        Ok(self.formatter.list("list_bases", "base", &data, None))
    }

    async fn fetch_tables(&self, base_id: &str) -> Result<Value> {
        self.api
            .send(ApiRequest::get(["meta", "bases", base_id, "tables"]))
            .await
    }

    async fn list_tables(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let payload = self.fetch_tables(base_id).await?;
        let summary = SchemaSummary::from_payload(base_id, &payload);
        Ok(self.formatter.table_overview("list_tables", Some(base_id), &summary.tables))
    }

    async fn create_table(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let mut body = Map::new();
        body.insert("name".into(), json!(args.required_str("table_name")?));
        if let Some(description) = args.optional_str("description")? {
            body.insert("description".into(), json!(description));
        }
        if let Some(fields) = args.raw("fields") {
            let fields: Vec<FieldDefinition> = serde_json::from_value(fields.clone())
                .map_err(|e| ToolError::InvalidArguments(format!("fields: {e}")))?;
            let prepared = fields
                .into_iter()
                .map(prepare_field)
                .collect::<Result<Vec<_>>>()?;
            body.insert("fields".into(), json!(prepared));
        }

        self.send_success(
            "create_table",
            ApiRequest::post(["meta", "bases", base_id, "tables"], Value::Object(body)),
        )
        .await
    }

    async fn update_table(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_id = args.required_str("table_id")?;
        let mut body = Map::new();
        for key in ["name", "description"] {
            if let Some(value) = args.optional_str(key)? {
                body.insert(key.into(), json!(value));
            }
        }

        self.send_success(
            "update_table",
            ApiRequest::patch(["meta", "bases", base_id, "tables", table_id], Value::Object(body)),
        )
        .await
    }

    // == Fields ==
    async fn create_field(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_id = args.required_str("table_id")?;
        let field: FieldDefinition = serde_json::from_value(Value::Object(args.required_object("field")?.clone()))
            .map_err(|e| ToolError::InvalidArguments(format!("field: {e}")))?;
        let field = prepare_field(field)?;

        self.send_success(
            "create_field",
            ApiRequest::post(["meta", "bases", base_id, "tables", table_id, "fields"], json!(field)),
        )
        .await
    }

    async fn update_field(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_id = args.required_str("table_id")?;
        let field_id = args.required_str("field_id")?;
        let updates = args.required_object("updates")?;

        self.send_success(
            "update_field",
            ApiRequest::patch(
                ["meta", "bases", base_id, "tables", table_id, "fields", field_id],
                Value::Object(updates.clone()),
            ),
        )
        .await
    }

    async fn list_fields(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_id = args.required_str("table_id")?;
        let data = self
            .api
            .send(ApiRequest::get(["meta", "bases", base_id, "tables", table_id, "fields"]))
            .await?;
        Ok(self.formatter.list("list_fields", "field", &data, Some(base_id)))
    }

    async fn delete_field(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_id = args.required_str("table_id")?;
        let field_id = args.required_str("field_id")?;
        self.send_success(
            "delete_field",
            ApiRequest::delete(["meta", "bases", base_id, "tables", table_id, "fields", field_id]),
        )
        .await
    }

    // == Records ==
    async fn list_records(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let mut request = ApiRequest::get([base_id, table_name]);
        if let Some(max) = args.optional_u64("max_records")?.filter(|n| *n > 0) {
            request = request.with_query("maxRecords", max.to_string());
        }

        let data = self.api.send(request).await?;
        Ok(self.formatter.records("list_records", &data, base_id, table_name))
    }

    async fn create_record(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let fields = args.required_object("fields")?;
        self.send_success(
            "create_record",
            ApiRequest::post([base_id, table_name], json!({ "fields": fields })),
        )
        .await
    }

    async fn update_record(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let record_id = args.required_str("record_id")?;
        let fields = args.required_object("fields")?;
        self.send_success(
            "update_record",
            ApiRequest::patch([base_id, table_name, record_id], json!({ "fields": fields })),
        )
        .await
    }

    async fn delete_record(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let record_id = args.required_str("record_id")?;
        self.send_success("delete_record", ApiRequest::delete([base_id, table_name, record_id]))
            .await
    }

    async fn search_records(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let field_name = args.required_str("field_name")?;
        let value = args.required_str("value")?;

        let request = ApiRequest::get([base_id, table_name])
            .with_query("filterByFormula", equality_formula(field_name, value));
        let data = self.api.send(request).await?;
        Ok(self.formatter.records("search_records", &data, base_id, table_name))
    }

    async fn get_record(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let record_id = args.required_str("record_id")?;
        self.send_success("get_record", ApiRequest::get([base_id, table_name, record_id]))
            .await
    }

    async fn batch_create_records(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let body = batch_body(args.required_array("records")?, args.optional_bool("typecast")?);
        self.send_success("batch_create_records", ApiRequest::post([base_id, table_name], body))
            .await
    }

    async fn batch_update_records(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let body = batch_body(args.required_array("records")?, args.optional_bool("typecast")?);
        self.send_success("batch_update_records", ApiRequest::patch([base_id, table_name], body))
            .await
    }

    async fn batch_delete_records(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let record_ids = args
            .optional_str_list("record_ids")?
            .ok_or_else(|| ToolError::InvalidArguments("record_ids is required".into()))?;

        let request = record_ids
            .into_iter()
            .fold(ApiRequest::delete([base_id, table_name]), |request, id| {
                request.with_query("records[]", id)
            });
        self.send_success("batch_delete_records", request).await
    }

    async fn advanced_list_records(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_name = args.required_str("table_name")?;
        let mut request = ApiRequest::get([base_id, table_name]);

        if let Some(formula) = args.optional_str("filter_by_formula")? {
            request = request.with_query("filterByFormula", formula);
        }
        if let Some(sort) = args.raw("sort") {
            let sort = sort
                .as_array()
                .ok_or_else(|| ToolError::InvalidArguments("sort must be an array".into()))?;
            for (index, sort_key) in sort.iter().enumerate() {
                let field = sort_key.get("field").and_then(Value::as_str).ok_or_else(|| {
                    ToolError::InvalidArguments(format!("sort[{index}] requires a field"))
                })?;
                request = request.with_query(format!("sort[{index}][field]"), field);
                if let Some(direction) = sort_key.get("direction").and_then(Value::as_str) {
                    request = request.with_query(format!("sort[{index}][direction]"), direction);
                }
            }
        }
        if let Some(max) = args.optional_u64("max_records")?.filter(|n| *n > 0) {
            request = request.with_query("maxRecords", max.to_string());
        }
        if let Some(size) = args.optional_u64("page_size")?.filter(|n| *n > 0) {
            request = request.with_query("pageSize", size.to_string());
        }
        if let Some(view) = args.optional_str("view")? {
            request = request.with_query("view", view);
        }
        for field in args.optional_str_list("fields")?.unwrap_or_default() {
            request = request.with_query("fields[]", field);
        }
        for (arg, key) in [
            ("cell_format", "cellFormat"),
            ("time_zone", "timeZone"),
            ("user_locale", "userLocale"),
            ("offset", "offset"),
        ] {
            if let Some(value) = args.optional_str(arg)? {
                request = request.with_query(key, value);
            }
        }

        let data = self.api.send(request).await?;
        Ok(self.formatter.records("advanced_list_records", &data, base_id, table_name))
    }

    // == Base Schema ==
    async fn list_cached_schemas(&self) -> Result<ToolResult> {
        let entries = self.cache.read().await.list_entries();
        Ok(self.formatter.cached_entries(&entries))
    }

    async fn get_base_summary(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let payload = self.fetch_tables(base_id).await?;
        let summary = SchemaSummary::from_payload(base_id, &payload);

        let base_name = match self.api.send(ApiRequest::get(["meta", "bases", base_id])).await {
            Ok(meta) => meta
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Unknown Base")
                .to_string(),
            Err(err) => {
                debug!(base_id, error = %err, "Base metadata unavailable");
                "Unknown Base".to_string()
            }
        };

        Ok(self.formatter.base_summary(base_id, &base_name, &summary.tables))
    }

    /// Three modes, checked in order: chunk retrieval by `cache_id`,
    /// per-table detail by `table_ids`, then a full fetch for `base_id`.
    async fn get_base_schema(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        if let Some(cache_id) = args.optional_str("cache_id")? {
            let index = args.optional_u64("chunk_offset")?.unwrap_or(0);
            let index = usize::try_from(index).unwrap_or(usize::MAX);
            let outcome = self.cache.write().await.get_chunk(cache_id, index);
            return Ok(match outcome {
                Ok(chunk) => {
                    debug!(cache_id, index, total = chunk.total, "Serving schema chunk");
                    self.formatter.schema_chunk(&chunk)
                }
                Err(err) => {
                    info!(cache_id, index, error = %err, "Schema chunk unavailable");
                    self.formatter.chunk_unavailable(&err)
                }
            });
        }

        let base_id = args.required_str("base_id")?;

        if let Some(table_ids) = args.optional_str_list("table_ids")?.filter(|ids| !ids.is_empty()) {
            let tables = self.fetch_table_details(base_id, &table_ids).await;
            return Ok(self.formatter.table_details(&tables));
        }

        if !args.optional_bool("use_cache")?.unwrap_or(true) {
            let payload = self.fetch_tables(base_id).await?;
            let summary = SchemaSummary::from_payload(base_id, &payload);
            return Ok(self.formatter.table_overview("get_base_schema", Some(base_id), &summary.tables));
        }

        let payload = match self.fetch_tables(base_id).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(base_id, error = %err, "Schema fetch failed");
                return Ok(self.formatter.schema_failure(&err));
            }
        };

        let mut cache = self.cache.write().await;
        let cache_id = cache.store(base_id, payload);
        let summary = cache
            .get_summary(&cache_id)
            .cloned()
            .ok_or_else(|| CacheError::NotFound { cache_id: cache_id.clone() })?;
        info!(base_id, %cache_id, tables = summary.table_count, "Schema cached");

        Ok(self.formatter.schema_cached(&cache_id, &summary))
    }

    /// Fetches tables concurrently, keeping request order. Failed tables are skipped.
    async fn fetch_table_details(&self, base_id: &str, table_ids: &[&str]) -> Vec<Value> {
        let handles: Vec<_> = table_ids
            .iter()
            .map(|table_id| {
                let api = Arc::clone(&self.api);
                let request = ApiRequest::get(["meta", "bases", base_id, "tables", *table_id]);
                tokio::spawn(async move { api.send(request).await })
            })
            .collect();

        let mut tables = Vec::with_capacity(handles.len());
        for (handle, table_id) in handles.into_iter().zip(table_ids) {
            match handle.await {
                Ok(Ok(table)) => tables.push(table),
                Ok(Err(err)) => debug!(table_id, error = %err, "Skipping table"),
                Err(err) => warn!(table_id, error = %err, "Table fetch task failed"),
            }
        }
        tables
    }

    async fn delete_base(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        self.send_success("delete_base", ApiRequest::delete(["meta", "bases", base_id]))
            .await
    }

    // == Views ==
    async fn list_views(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_id = args.required_str("table_id")?;
        let data = self
            .api
            .send(ApiRequest::get(["meta", "bases", base_id, "tables", table_id, "views"]))
            .await?;
        Ok(self.formatter.list("list_views", "view", &data, Some(base_id)))
    }

    async fn get_view(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let path = view_path(args)?;
        self.send_success("get_view", ApiRequest::get(path)).await
    }

    async fn create_view(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let table_id = args.required_str("table_id")?;
        let view = args.required_object("view")?;
        self.send_success(
            "create_view",
            ApiRequest::post(
                ["meta", "bases", base_id, "tables", table_id, "views"],
                Value::Object(view.clone()),
            ),
        )
        .await
    }

    async fn update_view(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let path = view_path(args)?;
        let updates = args.required_object("updates")?;
        self.send_success("update_view", ApiRequest::patch(path, Value::Object(updates.clone())))
            .await
    }

    async fn delete_view(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let path = view_path(args)?;
        self.send_success("delete_view", ApiRequest::delete(path)).await
    }

    // == Webhooks ==
    async fn list_webhooks(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let data = self
            .api
            .send(ApiRequest::get(["bases", base_id, "webhooks"]))
            .await?;
        Ok(self.formatter.list("list_webhooks", "webhook", &data, Some(base_id)))
    }

    async fn create_webhook(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let notification_url = args.required_str("notification_url")?;
        let specification = args.required_object("specification")?;
        self.send_success(
            "create_webhook",
            ApiRequest::post(
                ["bases", base_id, "webhooks"],
                json!({ "notificationUrl": notification_url, "specification": specification }),
            ),
        )
        .await
    }

    async fn update_webhook(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let webhook_id = args.required_str("webhook_id")?;
        let updates = args.required_object("updates")?;
        self.send_success(
            "update_webhook",
            ApiRequest::patch(["bases", base_id, "webhooks", webhook_id], Value::Object(updates.clone())),
        )
        .await
    }

    async fn delete_webhook(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let webhook_id = args.required_str("webhook_id")?;
        self.send_success("delete_webhook", ApiRequest::delete(["bases", base_id, "webhooks", webhook_id]))
            .await
    }

    async fn get_webhook_payloads(&self, args: ToolArgs<'_>) -> Result<ToolResult> {
        let base_id = args.required_str("base_id")?;
        let webhook_id = args.required_str("webhook_id")?;
        let mut request = ApiRequest::get(["bases", base_id, "webhooks", webhook_id, "payloads"]);
        // the API returns the cursor as a number; accept it either way
        let cursor = match args.raw("cursor") {
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => args.optional_str("cursor")?.map(str::to_string),
        };
        if let Some(cursor) = cursor {
            request = request.with_query("cursor", cursor);
        }
        if let Some(limit) = args.optional_u64("limit")?.filter(|n| *n > 0) {
            request = request.with_query("limit", limit.to_string());
        }

        let data = self.api.send(request).await?;
        Ok(self.formatter.list("get_webhook_payloads", "payload", &data, Some(base_id)))
    }
}

// == Utility Functions ==
fn view_path<'a>(args: ToolArgs<'a>) -> Result<Vec<&'a str>> {
    let base_id = args.required_str("base_id")?;
    let table_id = args.required_str("table_id")?;
    let view_id = args.required_str("view_id")?;
    Ok(vec!["meta", "bases", base_id, "tables", table_id, "views", view_id])
}

fn batch_body(records: &[Value], typecast: Option<bool>) -> Value {
    let mut body = json!({ "records": records });
    if let Some(typecast) = typecast {
        body["typecast"] = json!(typecast);
    }
    body
}

/// `{field} = "value"` with quotes and backslashes in the value escaped.
fn equality_formula(field_name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{{{field_name}}} = \"{escaped}\"")
}
