//! Agents: a bound configuration plus memory, driven by the step engine.

pub mod agent;
pub mod as_tool;
pub mod engine;
pub mod events;
pub mod persistence;
pub mod prompt;
pub mod recovery;
pub mod stats;

pub use agent::{Agent, MAX_AGENT_STEPS};
pub use as_tool::AgentAsTool;
pub use engine::RunOptions;
pub use events::{AgentEvent, AgentEventKind, AgentEvents, ListenerId};
pub use persistence::{persistence_hook, FileHistoryStore, PersistenceHook, PersistenceParams};
pub use prompt::compose_system_prompt;
pub use recovery::{RecoveryData, RecoveryInfo};
pub use stats::{ExecutionStats, RunStatus};
