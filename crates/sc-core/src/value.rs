use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered property name -> scalar mapping. Authored order is kept.
pub type PropertyMap = IndexMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    String(String),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("true"),
            Self::Bool(false) => f.write_str("false"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Normalizes a raw authored value. Only the exact literals `true` and `false`
/// become booleans; everything else is trimmed and kept as a string.
pub fn coerce_scalar(raw: &str) -> PropertyValue {
    match raw {
        "true" => PropertyValue::Bool(true),
        "false" => PropertyValue::Bool(false),
        other => PropertyValue::String(other.trim().to_string()),
    }
}

/// Reads a JSON scalar as a property value. Returns `None` for arrays, objects and null.
pub fn property_value_from_json(value: &serde_json::Value) -> Option<PropertyValue> {
    match value {
        serde_json::Value::Bool(value) => Some(PropertyValue::Bool(*value)),
        serde_json::Value::String(value) => Some(coerce_scalar(value)),
        serde_json::Value::Number(value) => Some(PropertyValue::String(value.to_string())),
        _ => None,
    }
}
