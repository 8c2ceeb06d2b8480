//! Model provider boundary.
//!
//! The engine needs one capability: complete a chat given an ordered
//! message list, optional tool declarations and a response-format hint,
//! returning usage plus zero or one choice.

pub mod http;
pub mod openai_compatible;

use async_trait::async_trait;
use tracing::debug;

use crate::config::CuriaConfig;
use crate::error::{CuriaError, Result};
use crate::tools::ToolDefinition;
use crate::types::{LlmConfig, Message, ResponseFormat, Usage};

pub use openai_compatible::OpenAiCompatibleProvider;

/// Model used when neither the caller nor `CURIA_MODEL` picks one.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// A chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Empty when the agent has no tools.
    pub tools: Vec<ToolDefinition>,
    pub response_format: ResponseFormat,
    pub config: LlmConfig,
}

/// A chat completion response.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub usage: Usage,
    /// The first choice's message, if the provider returned any.
    pub choice: Option<Message>,
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openrouter").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Response format hint sent with every request.
    fn response_format(&self) -> ResponseFormat {
        ResponseFormat::Text
    }

    /// Complete a chat (non-streaming).
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Build the default provider from configured credentials.
///
/// OpenRouter is preferred over OpenAI. The model is `CURIA_MODEL` or
/// [`DEFAULT_MODEL`].
pub fn create_default_provider(config: &CuriaConfig) -> Result<OpenAiCompatibleProvider> {
    let model = config.model().unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let candidates = [
        ("openrouter", OPENROUTER_BASE_URL),
        ("openai", OPENAI_BASE_URL),
    ];
    for (provider, default_base) in candidates {
        if let Some(api_key) = config.get_api_key(provider) {
            let base_url = config
                .get_base_url(provider)
                .unwrap_or_else(|| default_base.to_string());
            debug!(provider, model = %model, base_url = %base_url, "Creating default provider");
            return Ok(OpenAiCompatibleProvider::new(provider, model, api_key, base_url));
        }
    }

    Err(CuriaError::Authentication(
        "Missing OPENROUTER_API_KEY or OPENAI_API_KEY".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_openrouter_credentials() {
        let config = CuriaConfig::new();
        config.set_api_key("openai", "sk-openai".into());
        config.set_api_key("openrouter", "sk-or".into());

        let provider = create_default_provider(&config).unwrap();

        assert_eq!(provider.provider_name(), "openrouter");
        assert_eq!(provider.model_id(), DEFAULT_MODEL);
        assert_eq!(provider.base_url(), OPENROUTER_BASE_URL);
    }

    #[test]
    fn honours_model_and_base_url_overrides() {
        let config = CuriaConfig::new();
        config.set_api_key("openai", "sk-openai".into());
        config.set_base_url("openai", "http://localhost:8080/v1".into());
        config.set_model("gpt-4o-mini".into());

        let provider = create_default_provider(&config).unwrap();

        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model_id(), "gpt-4o-mini");
        assert_eq!(provider.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn missing_credentials_is_an_auth_error() {
        let err = create_default_provider(&CuriaConfig::new()).unwrap_err();
        assert!(matches!(err, CuriaError::Authentication(_)));
    }
}
