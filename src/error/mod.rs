//! Error types for curia.

use thiserror::Error;

/// Primary error type for all curia operations.
#[derive(Error, Debug)]
pub enum CuriaError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Invalid tool: {0}")]
    InvalidTool(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider error: {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("LLM returned an empty message or no content")]
    EmptyResponse,

    #[error("LLM returned no choices")]
    NoChoices,

    #[error("Final output is not a valid JSON object: {0}")]
    OutputExtraction(String),

    #[error("Final output does not match schema: {0}")]
    OutputValidation(String),

    #[error("Maximum execution steps ({0}) reached. Task not completed.")]
    MaxTurnsExceeded(usize),

    #[error("Execution aborted")]
    Aborted,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Broad error category, following the engine's failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Provider,
    Network,
    ToolExecution,
    Protocol,
    Budget,
    Cancellation,
    Serialization,
    Unknown,
}

impl CuriaError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a provider error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_)
            | Self::DuplicateTool(_)
            | Self::InvalidTool(_)
            | Self::Toml(_)
            | Self::Io(_) => ErrorCategory::Configuration,
            Self::Api { .. }
            | Self::Provider { .. }
            | Self::Authentication(_)
            | Self::RateLimited { .. } => ErrorCategory::Provider,
            Self::Network(_) => ErrorCategory::Network,
            Self::ToolExecution { .. } | Self::Timeout(_) | Self::InvalidArgument(_) => {
                ErrorCategory::ToolExecution
            }
            Self::EmptyResponse
            | Self::NoChoices
            | Self::OutputExtraction(_)
            | Self::OutputValidation(_) => ErrorCategory::Protocol,
            Self::MaxTurnsExceeded(_) => ErrorCategory::Budget,
            Self::Aborted => ErrorCategory::Cancellation,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::InvalidState(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the step engine propagates this error to the caller.
    ///
    /// Tool-level failures are encoded into tool-result messages instead.
    pub fn is_fatal_to_run(&self) -> bool {
        !matches!(self.category(), ErrorCategory::ToolExecution)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CuriaError>;
