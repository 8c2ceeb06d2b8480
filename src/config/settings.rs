//! Agent and council defaults loaded from `~/.curia/settings.toml`.

use std::path::{Path, PathBuf};

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::LlmConfig;

pub const DEFAULT_MAX_TURNS: usize = 88;
pub const DEFAULT_MAX_MESSAGE_HISTORY: usize = 50;
pub const DEFAULT_COUNCIL_MAX_ROUNDS: usize = 58;
pub const DEFAULT_MAX_INVALID_SELECTIONS: usize = 5;

/// File-backed defaults for agents and councils.
///
/// Every field is optional in the file; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_turns: usize,
    pub max_message_history: usize,
    pub enable_message_compression: bool,
    pub council_max_rounds: usize,
    pub max_invalid_selections: usize,
    pub llm: LlmConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            max_message_history: DEFAULT_MAX_MESSAGE_HISTORY,
            enable_message_compression: true,
            council_max_rounds: DEFAULT_COUNCIL_MAX_ROUNDS,
            max_invalid_selections: DEFAULT_MAX_INVALID_SELECTIONS,
            llm: LlmConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from `path`, returning defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load from the default location (`~/.curia/settings.toml`).
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// `~/.curia/settings.toml`, when a home directory can be resolved.
    pub fn default_path() -> Option<PathBuf> {
        UserDirs::new().map(|dirs| dirs.home_dir().join(".curia").join("settings.toml"))
    }
}
