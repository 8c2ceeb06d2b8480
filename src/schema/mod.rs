//! Schema capability used for tool argument shapes and final outputs.
//!
//! The engine only needs two things from a schema: its JSON Schema form (to
//! advertise to the provider and to describe output formatting) and a
//! `safe_parse` style validate-and-transform call.

pub mod validation;

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use validation::validate_value;

/// Validator capability for structured values.
pub trait OutputSchema: Send + Sync {
    /// JSON Schema describing the accepted shape.
    fn json_schema(&self) -> Value;

    /// Validate `value`, returning the (possibly transformed) accepted value
    /// or a description of the failure.
    fn safe_parse(&self, value: &Value) -> Result<Value, String>;
}

/// Schema backed by a raw JSON Schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchema {
    schema: Value,
}

impl JsonSchema {
    pub fn new(schema: Value) -> Self {
        Self { schema }
    }

    /// Object schema whose listed properties are all required strings.
    pub fn string_fields(fields: &[(&str, &str)]) -> Self {
        let mut properties = serde_json::Map::new();
        for (name, description) in fields {
            properties.insert(
                (*name).to_string(),
                serde_json::json!({ "type": "string", "description": description }),
            );
        }
        let required: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        Self::new(serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }))
    }
}

impl OutputSchema for JsonSchema {
    fn json_schema(&self) -> Value {
        self.schema.clone()
    }

    fn safe_parse(&self, value: &Value) -> Result<Value, String> {
        validate_value(value, &self.schema)?;
        Ok(value.clone())
    }
}

/// Schema that additionally round-trips values through a Rust type.
///
/// The value must pass structural validation and deserialize into `T`; the
/// accepted value is `T` serialized back, so serde defaults and renames
/// apply.
pub struct TypedSchema<T> {
    schema: Value,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    pub fn new(schema: Value) -> Self {
        Self {
            schema,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for TypedSchema<T> {
    fn clone(&self) -> Self {
        Self::new(self.schema.clone())
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("type", &std::any::type_name::<T>())
            .field("schema", &self.schema)
            .finish()
    }
}

impl<T> OutputSchema for TypedSchema<T>
where
    T: DeserializeOwned + Serialize,
{
    fn json_schema(&self) -> Value {
        self.schema.clone()
    }

    fn safe_parse(&self, value: &Value) -> Result<Value, String> {
        validate_value(value, &self.schema)?;
        let typed: T = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
        serde_json::to_value(typed).map_err(|e| e.to_string())
    }
}
