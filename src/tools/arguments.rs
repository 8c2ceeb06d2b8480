//! Typed access to tool call arguments.

use serde_json::Value;

use crate::error::CuriaError;

/// Arguments for one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArguments {
    value: Value,
}

impl ToolArguments {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Parse the raw argument text sent by the model.
    ///
    /// Empty or malformed JSON yields empty-object arguments.
    pub fn from_model_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        let value = if trimmed.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(trimmed).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Malformed tool arguments, using {{}}");
                Value::Object(Default::default())
            })
        };
        Self { value }
    }

    pub fn raw(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.value.get(key)
    }

    /// Get a required string argument.
    pub fn get_str(&self, key: &str) -> Result<&str, CuriaError> {
        self.value
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| CuriaError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(Value::as_str)
    }

    /// Get a required numeric argument.
    pub fn get_f64(&self, key: &str) -> Result<f64, CuriaError> {
        self.value
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| CuriaError::InvalidArgument(format!("Missing number argument: {key}")))
    }

    /// Overwrite one field, turning non-object arguments into an object.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        if !self.value.is_object() {
            self.value = Value::Object(Default::default());
        }
        if let Value::Object(map) = &mut self.value {
            map.insert(key.into(), value);
        }
    }

    /// Deserialize the arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, CuriaError> {
        serde_json::from_value(self.value.clone()).map_err(|e| {
            CuriaError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}

impl From<Value> for ToolArguments {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
