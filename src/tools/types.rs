//! Tool parameter schemas and provider-facing declarations.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON Schema describing a tool's argument (or return) shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolParameters {
    pub schema: Value,
}

impl ToolParameters {
    pub fn from_schema(schema: Value) -> Self {
        Self { schema }
    }

    /// Object schema with no properties.
    pub fn empty() -> Self {
        Self::object().build()
    }

    /// The `{prompt: string}` envelope used by agents exposed as tools.
    pub fn prompt_envelope() -> Self {
        Self::object()
            .string("prompt", "Task or question for the agent", true)
            .build()
    }

    /// The `{content: string}` envelope returned by agents exposed as tools.
    pub fn content_envelope() -> Self {
        Self::object()
            .string("content", "The agent's final answer", true)
            .build()
    }

    pub fn object() -> ParameterBuilder {
        ParameterBuilder::default()
    }
}

/// Builder for object parameter schemas.
#[derive(Debug, Default)]
pub struct ParameterBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    pub fn string(self, name: impl Into<String>, description: &str, required: bool) -> Self {
        self.property(name, json!({ "type": "string", "description": description }), required)
    }

    pub fn number(self, name: impl Into<String>, description: &str, required: bool) -> Self {
        self.property(name, json!({ "type": "number", "description": description }), required)
    }

    pub fn integer(self, name: impl Into<String>, description: &str, required: bool) -> Self {
        self.property(name, json!({ "type": "integer", "description": description }), required)
    }

    pub fn boolean(self, name: impl Into<String>, description: &str, required: bool) -> Self {
        self.property(name, json!({ "type": "boolean", "description": description }), required)
    }

    /// String restricted to `values`.
    pub fn string_enum(
        self,
        name: impl Into<String>,
        description: &str,
        values: &[&str],
        required: bool,
    ) -> Self {
        self.property(
            name,
            json!({ "type": "string", "description": description, "enum": values }),
            required,
        )
    }

    /// Arbitrary property schema.
    pub fn property(mut self, name: impl Into<String>, schema: Value, required: bool) -> Self {
        let name = name.into();
        if required && !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    pub fn build(self) -> ToolParameters {
        ToolParameters {
            schema: json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}

/// Tool declaration advertised to the model provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}
