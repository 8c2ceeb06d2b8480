//! Convenience re-exports for common use.

pub use crate::agent::{
    Agent, AgentEvent, AgentEventKind, ExecutionStats, RecoveryData, RunOptions, RunStatus,
};
pub use crate::config::{CuriaConfig, Settings};
pub use crate::council::Council;
pub use crate::error::{CuriaError, Result};
pub use crate::memory::{HandoffOptions, Memory};
pub use crate::provider::ModelProvider;
pub use crate::schema::{JsonSchema, OutputSchema, TypedSchema};
pub use crate::tools::{NativeTool, Tool, ToolArguments, ToolContext, ToolMiddleware, ToolParameters};
pub use crate::types::{AgentInput, AgentOutput, LlmConfig, Message, Role, Usage};
