//! Model call settings and response format hints.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sampling settings for a model call.
///
/// Every field is optional so configurations can be layered: engine defaults,
/// then the agent's defaults, then the per-run override.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
pub struct LlmConfig {
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub presence_penalty: Option<f64>,
}

impl LlmConfig {
    /// Defaults applied underneath every agent configuration.
    pub fn engine_defaults() -> Self {
        Self {
            temperature: Some(0.1),
            max_tokens: None,
            top_p: None,
            frequency_penalty: Some(1.0),
            presence_penalty: Some(1.0),
        }
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merged_with(&self, other: &LlmConfig) -> LlmConfig {
        LlmConfig {
            temperature: other.temperature.or(self.temperature),
            max_tokens: other.max_tokens.or(self.max_tokens),
            top_p: other.top_p.or(self.top_p),
            frequency_penalty: other.frequency_penalty.or(self.frequency_penalty),
            presence_penalty: other.presence_penalty.or(self.presence_penalty),
        }
    }
}

/// Response format hint passed to the provider.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_call_settings_override_defaults() {
        let agent = LlmConfig::builder().temperature(0.7).build();
        let call = LlmConfig::builder().max_tokens(256).build();

        let merged = LlmConfig::engine_defaults()
            .merged_with(&agent)
            .merged_with(&call);

        assert_eq!(merged.temperature, Some(0.7));
        assert_eq!(merged.max_tokens, Some(256));
        assert_eq!(merged.frequency_penalty, Some(1.0));
        assert_eq!(merged.presence_penalty, Some(1.0));
    }

    #[test]
    fn response_format_round_trips_through_strings() {
        assert_eq!(ResponseFormat::JsonObject.to_string(), "json_object");
        assert_eq!("text".parse::<ResponseFormat>().unwrap(), ResponseFormat::Text);
    }
}
