//! Shape helpers for the untyped document tree
//!
//! Both validators and the resolver walk the same YAML-derived value tree
//! before any typed deserialization exists, so the field-poking lives here.

use serde_json::Value as JsonValue;

/// Name of a component entry: the string itself for a bare-name reference,
/// else the entry's `name` field.
pub fn entry_name(entry: &JsonValue) -> Option<&str> {
    match entry {
        JsonValue::String(s) => Some(s.as_str()),
        JsonValue::Object(obj) => obj.get("name").and_then(JsonValue::as_str),
        _ => None,
    }
}

/// Array field of an object, empty when absent or differently shaped
pub fn list<'a>(value: &'a JsonValue, key: &str) -> &'a [JsonValue] {
    value
        .get(key)
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// String field of an object
pub fn str_field<'a>(value: &'a JsonValue, key: &str) -> Option<&'a str> {
    value.get(key).and_then(JsonValue::as_str)
}
