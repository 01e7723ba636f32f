//! Field Definitions
//!
//! Field type catalogue, default options, and option validation applied to
//! field definitions before they are sent to the remote API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Result, ToolError};

// == Field Type ==
/// Known field types. Unrecognized names are carried through as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    SingleLineText,
    MultilineText,
    Email,
    PhoneNumber,
    RichText,
    Url,
    Number,
    Currency,
    Percent,
    Date,
    DateTime,
    Duration,
    SingleSelect,
    MultipleSelects,
    Rating,
    Checkbox,
    Formula,
    Rollup,
    Lookup,
    MultipleRecordLinks,
    Attachment,
    Barcode,
    Button,
    Count,
    AutoNumber,
    /// Legacy spelling of `multipleSelects`
    MultiSelect,
    Other(String),
}

impl FieldType {
    pub fn parse(name: &str) -> Self {
        match name {
            "singleLineText" => FieldType::SingleLineText,
            "multilineText" => FieldType::MultilineText,
            "email" => FieldType::Email,
            "phoneNumber" => FieldType::PhoneNumber,
            "richText" => FieldType::RichText,
            "url" => FieldType::Url,
            "number" => FieldType::Number,
            "currency" => FieldType::Currency,
            "percent" => FieldType::Percent,
            "date" => FieldType::Date,
            "dateTime" => FieldType::DateTime,
            "duration" => FieldType::Duration,
            "singleSelect" => FieldType::SingleSelect,
            "multipleSelects" => FieldType::MultipleSelects,
            "rating" => FieldType::Rating,
            "checkbox" => FieldType::Checkbox,
            "formula" => FieldType::Formula,
            "rollup" => FieldType::Rollup,
            "lookup" => FieldType::Lookup,
            "multipleRecordLinks" => FieldType::MultipleRecordLinks,
            "attachment" => FieldType::Attachment,
            "barcode" => FieldType::Barcode,
            "button" => FieldType::Button,
            "count" => FieldType::Count,
            "autoNumber" => FieldType::AutoNumber,
            "multiSelect" => FieldType::MultiSelect,
            other => FieldType::Other(other.to_string()),
        }
    }

    // == Requires Options ==
    /// Whether the remote API expects an `options` object for this type.
    pub fn requires_options(&self) -> bool {
        matches!(
            self,
            FieldType::Number
                | FieldType::Currency
                | FieldType::Percent
                | FieldType::Date
                | FieldType::DateTime
                | FieldType::Duration
                | FieldType::SingleSelect
                | FieldType::MultipleSelects
                | FieldType::MultiSelect
                | FieldType::Rating
                | FieldType::Checkbox
                | FieldType::Formula
                | FieldType::Rollup
                | FieldType::Lookup
                | FieldType::MultipleRecordLinks
                | FieldType::Barcode
                | FieldType::Button
                | FieldType::Count
        )
    }

    // == Default Options ==
    /// Options to fill in when the caller supplied none.
    ///
    /// Types whose options reference other tables or fields (formula, rollup,
    /// lookup, links, count) have no sensible default.
    pub fn default_options(&self) -> Option<Value> {
        let options = match self {
            FieldType::Number => json!({ "precision": 0 }),
            FieldType::Currency => json!({ "precision": 2, "symbol": "$" }),
            FieldType::Percent => json!({ "precision": 2 }),
            FieldType::Date => json!({ "dateFormat": { "name": "local" } }),
            FieldType::DateTime => json!({
                "dateFormat": { "name": "local" },
                "timeFormat": { "name": "12hour" },
                "timeZone": "client"
            }),
            FieldType::Duration => json!({ "durationFormat": "h:mm" }),
            FieldType::SingleSelect | FieldType::MultipleSelects | FieldType::MultiSelect => json!({
                "choices": [
                    { "name": "Option 1", "color": "blueBright" },
                    { "name": "Option 2", "color": "greenBright" }
                ]
            }),
            FieldType::Rating => json!({ "max": 5, "color": "yellowBright", "icon": "star" }),
            FieldType::Checkbox => json!({ "color": "greenBright", "icon": "check" }),
            FieldType::Barcode => json!({ "result": { "type": "text" } }),
            FieldType::Button => json!({ "label": "Click Me", "url": "https://example.com" }),
            FieldType::AutoNumber => json!({}),
            _ => return None,
        };
        Some(options)
    }

    // == Validate Options ==
    /// Checks type-specific constraints on caller-supplied options.
    pub fn validate_options(&self, options: &Map<String, Value>) -> bool {
        let has = |key: &str| options.get(key).is_some_and(|v| !v.is_null());
        let precision_ok = || {
            options
                .get("precision")
                .and_then(Value::as_f64)
                .is_some_and(|p| (0.0..=8.0).contains(&p))
        };

        match self {
            FieldType::Number | FieldType::Percent => precision_ok(),
            FieldType::Currency => {
                precision_ok() && options.get("symbol").is_some_and(Value::is_string)
            }
            FieldType::Rating => options
                .get("max")
                .and_then(Value::as_f64)
                .is_some_and(|m| (1.0..=10.0).contains(&m)),
            FieldType::SingleSelect | FieldType::MultipleSelects | FieldType::MultiSelect => options
                .get("choices")
                .and_then(Value::as_array)
                .is_some_and(|choices| !choices.is_empty()),
            FieldType::Formula => options.get("formula").is_some_and(Value::is_string),
            FieldType::Rollup => {
                has("linkedRecordFieldId") && has("recordLinkFieldId") && has("aggregationFunction")
            }
            FieldType::Lookup => has("linkedRecordFieldId") && has("recordLinkFieldId"),
            FieldType::MultipleRecordLinks => has("linkedTableId"),
            FieldType::Count => has("linkedRecordFieldId"),
            _ => true,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::SingleLineText => "singleLineText",
            FieldType::MultilineText => "multilineText",
            FieldType::Email => "email",
            FieldType::PhoneNumber => "phoneNumber",
            FieldType::RichText => "richText",
            FieldType::Url => "url",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Percent => "percent",
            FieldType::Date => "date",
            FieldType::DateTime => "dateTime",
            FieldType::Duration => "duration",
            FieldType::SingleSelect => "singleSelect",
            FieldType::MultipleSelects => "multipleSelects",
            FieldType::Rating => "rating",
            FieldType::Checkbox => "checkbox",
            FieldType::Formula => "formula",
            FieldType::Rollup => "rollup",
            FieldType::Lookup => "lookup",
            FieldType::MultipleRecordLinks => "multipleRecordLinks",
            FieldType::Attachment => "attachment",
            FieldType::Barcode => "barcode",
            FieldType::Button => "button",
            FieldType::Count => "count",
            FieldType::AutoNumber => "autoNumber",
            FieldType::MultiSelect => "multiSelect",
            FieldType::Other(name) => name.as_str(),
        };
        f.write_str(name)
    }
}

// == Field Definition ==
/// A field as supplied by the caller and sent to the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

// == Prepare Field ==
/// Normalizes a field definition before it is sent.
///
/// - types that take no options have any supplied options removed
/// - types that take options get defaults when none were supplied
/// - supplied options are validated; failures are `ToolError::Validation`
pub fn prepare_field(mut field: FieldDefinition) -> Result<FieldDefinition> {
    let field_type = FieldType::parse(&field.field_type);

    if !field_type.requires_options() {
        field.options = None;
        return Ok(field);
    }

    match field.options.take() {
        None | Some(Value::Null) => {
            field.options = field_type.default_options();
            Ok(field)
        }
        Some(Value::Object(options)) => {
            if !field_type.validate_options(&options) {
                return Err(ToolError::Validation(format!(
                    "Invalid options for field type {}: {}",
                    field_type,
                    Value::Object(options)
                )));
            }
            field.options = Some(Value::Object(options));
            Ok(field)
        }
        Some(other) => Err(ToolError::Validation(format!(
            "Invalid options for field type {field_type}: expected an object, got {other}"
        ))),
    }
}
