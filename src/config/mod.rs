//! Configuration (layered: code > env), plus file-backed defaults.

pub mod settings;

pub use settings::Settings;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<CuriaConfig> = OnceLock::new();

const KEY_ENV_VARS: [(&str, &str); 2] = [
    ("OPENROUTER_API_KEY", "openrouter"),
    ("OPENAI_API_KEY", "openai"),
];

const URL_ENV_VARS: [(&str, &str); 2] = [
    ("OPENROUTER_BASE_URL", "openrouter"),
    ("OPENAI_BASE_URL", "openai"),
];

/// Environment variable selecting the default model.
pub const MODEL_ENV_VAR: &str = "CURIA_MODEL";

/// Provider credentials, base URLs and the default model.
///
/// Cloning shares the underlying maps. Explicit setters overwrite values
/// loaded from the environment.
#[derive(Debug, Clone, Default)]
pub struct CuriaConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
    model: Arc<RwLock<Option<String>>>,
}

impl CuriaConfig {
    /// Empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let config = Self::new();

        for (env_var, provider) in KEY_ENV_VARS {
            if let Ok(key) = std::env::var(env_var) {
                config.set_api_key(provider, key);
            }
        }
        for (env_var, provider) in URL_ENV_VARS {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }
        if let Ok(model) = std::env::var(MODEL_ENV_VAR) {
            config.set_model(model);
        }

        config
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static CuriaConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        self.api_keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(provider.to_string(), key);
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .filter(|key| !key.trim().is_empty())
            .cloned()
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        self.base_urls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(provider.to_string(), url);
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .cloned()
    }

    pub fn set_model(&self, model: String) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = Some(model);
    }

    pub fn model(&self) -> Option<String> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|m| !m.trim().is_empty())
    }

    pub fn has_credentials(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let config = CuriaConfig::new();
        let clone = config.clone();

        clone.set_api_key("openrouter", "sk-or".into());

        assert_eq!(config.get_api_key("openrouter").as_deref(), Some("sk-or"));
        assert!(config.has_credentials("openrouter"));
        assert!(!config.has_credentials("openai"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = CuriaConfig::new();
        config.set_api_key("openai", "  ".into());
        config.set_model(String::new());

        assert_eq!(config.get_api_key("openai"), None);
        assert_eq!(config.model(), None);
    }
}
