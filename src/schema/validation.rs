//! Structural validation of JSON values against a JSON Schema subset.
//!
//! Checks `type`, `required`, `properties`, `items` and `enum`, recursing
//! into nested objects and arrays. Anything else in the schema is ignored.

use serde_json::Value;

/// Validate `value` against `schema`.
///
/// Returns `Err(message)` describing the first violation found, with a
/// JSON-pointer-like path prefix for nested fields.
pub fn validate_value(value: &Value, schema: &Value) -> Result<(), String> {
    validate_at(value, schema, "")
}

fn validate_at(value: &Value, schema: &Value, path: &str) -> Result<(), String> {
    if let Some(expected) = schema.get("type") {
        if !type_allows(expected, value) {
            return Err(format!(
                "{}expected type '{}', got {}",
                field_prefix(path),
                type_label(expected),
                json_type_name(value)
            ));
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            return Err(format!(
                "{}value {} is not one of the allowed values",
                field_prefix(path),
                value
            ));
        }
    }

    if let Some(obj) = value.as_object() {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !obj.contains_key(name) {
                    return Err(format!("missing required field '{}'", join(path, name)));
                }
            }
        }
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (key, field) in obj {
                if let Some(field_schema) = properties.get(key) {
                    validate_at(field, field_schema, &join(path, key))?;
                }
            }
        }
    }

    if let (Some(items), Some(array)) = (schema.get("items"), value.as_array()) {
        for (index, item) in array.iter().enumerate() {
            validate_at(item, items, &join(path, &index.to_string()))?;
        }
    }

    Ok(())
}

fn type_allows(expected: &Value, value: &Value) -> bool {
    match expected {
        Value::String(name) => value_matches_type(value, name),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .any(|name| value_matches_type(value, name)),
        _ => true,
    }
}

fn value_matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_label(expected: &Value) -> String {
    match expected {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn field_prefix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("field '{path}' ")
    }
}
