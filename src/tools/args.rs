//! Typed access to tool-call arguments.

use serde_json::{Map, Value};

use crate::error::{Result, ToolError};

/// Borrowed view over a tool call's argument object.
#[derive(Debug, Clone, Copy)]
pub struct ToolArgs<'a> {
    inner: &'a Map<String, Value>,
}

impl<'a> ToolArgs<'a> {
    pub fn new(inner: &'a Map<String, Value>) -> Self {
        Self { inner }
    }

    /// A non-empty string argument.
    pub fn required_str(&self, key: &str) -> Result<&'a str> {
        match self.inner.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
            Some(Value::String(_)) => Err(ToolError::InvalidArguments(format!("{key} must not be empty"))),
            Some(_) => Err(ToolError::InvalidArguments(format!("{key} must be a string"))),
            None => Err(ToolError::InvalidArguments(format!("{key} is required"))),
        }
    }

    /// A string argument; absent, null and empty all read as `None`.
    pub fn optional_str(&self, key: &str) -> Result<Option<&'a str>> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ToolError::InvalidArguments(format!("{key} must be a string"))),
        }
    }

    /// A non-negative integer argument. Whole floats such as `2.0` are accepted.
    pub fn optional_u64(&self, key: &str) -> Result<Option<u64>> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
                .map(Some)
                .ok_or_else(|| {
                    ToolError::InvalidArguments(format!("{key} must be a non-negative integer"))
                }),
            Some(_) => Err(ToolError::InvalidArguments(format!("{key} must be a number"))),
        }
    }

    pub fn optional_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(ToolError::InvalidArguments(format!("{key} must be a boolean"))),
        }
    }

    pub fn required_object(&self, key: &str) -> Result<&'a Map<String, Value>> {
        match self.inner.get(key) {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(ToolError::InvalidArguments(format!("{key} must be an object"))),
            None => Err(ToolError::InvalidArguments(format!("{key} is required"))),
        }
    }

    pub fn required_array(&self, key: &str) -> Result<&'a Vec<Value>> {
        match self.inner.get(key) {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(ToolError::InvalidArguments(format!("{key} must be an array"))),
            None => Err(ToolError::InvalidArguments(format!("{key} is required"))),
        }
    }

    /// An optional array of strings.
    pub fn optional_str_list(&self, key: &str) -> Result<Option<Vec<&'a str>>> {
        match self.inner.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| {
                        ToolError::InvalidArguments(format!("{key} must contain only strings"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(_) => Err(ToolError::InvalidArguments(format!("{key} must be an array"))),
        }
    }

    /// Raw access for values passed through untouched.
    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.inner.get(key).filter(|v| !v.is_null())
    }
}
