//! Agent run input and output.

use serde::{Deserialize, Serialize};

/// Input handed to an agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentInput {
    Text(String),
    Structured(serde_json::Value),
}

impl AgentInput {
    /// Render as the content of a user message.
    ///
    /// Structured input becomes a fenced pretty-printed JSON block.
    pub fn to_message_content(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                let pretty =
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
                format!("```json\n{pretty}\n```")
            }
        }
    }

    /// JSON view of the input, used for persistence snapshots.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::Value::String(text.clone()),
            Self::Structured(value) => value.clone(),
        }
    }
}

impl From<&str> for AgentInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for AgentInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<serde_json::Value> for AgentInput {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}

/// Final result of an agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentOutput {
    /// Raw final text (no output schema configured).
    Text(String),
    /// Extracted and validated JSON object.
    Structured(serde_json::Value),
}

impl AgentOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Text as-is, structured output serialized to compact JSON.
    pub fn to_content_string(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => value.to_string(),
        }
    }

    pub fn into_value(self) -> serde_json::Value {
        match self {
            Self::Text(text) => serde_json::Value::String(text),
            Self::Structured(value) => value,
        }
    }
}

impl std::fmt::Display for AgentOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_content_string())
    }
}
