//! Core Agent struct and its configuration surface.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use super::as_tool::AgentAsTool;
use super::engine::{self, RunOptions};
use super::events::{AgentEvent, AgentEventKind, AgentEvents, ListenerId};
use super::persistence::PersistenceHook;
use super::recovery::RecoveryData;
use super::stats::ExecutionStats;
use crate::config::settings::{Settings, DEFAULT_MAX_MESSAGE_HISTORY, DEFAULT_MAX_TURNS};
use crate::error::{CuriaError, Result};
use crate::memory::{CompressFn, Memory};
use crate::provider::ModelProvider;
use crate::schema::OutputSchema;
use crate::tools::{Tool, ToolRegistry};
use crate::types::{AgentInput, AgentOutput, LlmConfig, Message};

/// Hard ceiling on `max_turns`.
pub const MAX_AGENT_STEPS: usize = 65535;

/// Immutable run configuration shared by an agent and its tool wrappers.
#[derive(Clone)]
pub(crate) struct AgentCore {
    pub(crate) name: String,
    pub(crate) instructions: String,
    pub(crate) description: Option<String>,
    pub(crate) provider: Arc<dyn ModelProvider>,
    pub(crate) tools: ToolRegistry,
    pub(crate) input_schema: Option<Arc<dyn OutputSchema>>,
    pub(crate) output_schema: Option<Arc<dyn OutputSchema>>,
    pub(crate) max_turns: usize,
    pub(crate) enable_message_compression: bool,
    pub(crate) compression: Option<CompressFn>,
    pub(crate) max_message_history: usize,
    pub(crate) llm_config: LlmConfig,
    pub(crate) persistence: Option<PersistenceHook>,
    pub(crate) events: AgentEvents,
}

/// An AI agent that maintains conversation memory and can use tools.
pub struct Agent {
    core: AgentCore,
    memory: Memory,
    stats: ExecutionStats,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.core.name)
            .field("provider", &self.core.provider.provider_name())
            .field("model", &self.core.provider.model_id())
            .field("tools", &self.core.tools.names())
            .field("max_turns", &self.core.max_turns)
            .field("messages", &self.memory.len())
            .finish()
    }
}

impl Agent {
    /// Create a new agent.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        let name = name.into();
        let instructions = instructions.into();
        let memory = Memory::new(&name, &instructions).with_max_history(DEFAULT_MAX_MESSAGE_HISTORY);
        Self {
            core: AgentCore {
                name,
                instructions,
                description: None,
                provider,
                tools: ToolRegistry::default(),
                input_schema: None,
                output_schema: None,
                max_turns: DEFAULT_MAX_TURNS,
                enable_message_compression: true,
                compression: None,
                max_message_history: DEFAULT_MAX_MESSAGE_HISTORY,
                llm_config: LlmConfig::default(),
                persistence: None,
                events: AgentEvents::new(),
            },
            memory,
            stats: ExecutionStats::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.core.description = Some(description.into());
        self
    }

    /// Replace the tool set. Fails on empty or duplicate names.
    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Result<Self> {
        self.core.tools = ToolRegistry::new(tools)?;
        Ok(self)
    }

    pub fn with_input_schema(mut self, schema: impl OutputSchema + 'static) -> Self {
        self.core.input_schema = Some(Arc::new(schema));
        self
    }

    /// Require the final answer to be a JSON object accepted by `schema`.
    pub fn with_output_schema(mut self, schema: impl OutputSchema + 'static) -> Self {
        self.core.output_schema = Some(Arc::new(schema));
        self
    }

    /// Set the step budget, capped at [`MAX_AGENT_STEPS`].
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.core.max_turns = max_turns.min(MAX_AGENT_STEPS);
        self
    }

    pub fn with_message_compression(mut self, enabled: bool) -> Self {
        self.core.enable_message_compression = enabled;
        self
    }

    /// Replace the default sliding window with a custom compression.
    pub fn with_compression(
        mut self,
        compress: impl Fn(&[Message]) -> Vec<Message> + Send + Sync + 'static,
    ) -> Self {
        self.core.compression = Some(Arc::new(compress));
        self
    }

    pub fn with_max_message_history(mut self, max_message_history: usize) -> Self {
        self.core.max_message_history = max_message_history;
        self.memory.set_max_history(max_message_history);
        self
    }

    pub fn with_llm_config(mut self, llm_config: LlmConfig) -> Self {
        self.core.llm_config = llm_config;
        self
    }

    pub fn with_persistence(mut self, hook: PersistenceHook) -> Self {
        self.core.persistence = Some(hook);
        self
    }

    /// Share an existing listener registry.
    pub fn with_events(mut self, events: AgentEvents) -> Self {
        self.core.events = events;
        self
    }

    /// Apply file-level defaults.
    pub fn with_settings(self, settings: &Settings) -> Self {
        let llm_config = settings.llm.merged_with(&self.core.llm_config);
        self.with_max_turns(settings.max_turns)
            .with_max_message_history(settings.max_message_history)
            .with_message_compression(settings.enable_message_compression)
            .with_llm_config(llm_config)
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn instructions(&self) -> &str {
        &self.core.instructions
    }

    pub fn description(&self) -> Option<&str> {
        self.core.description.as_deref()
    }

    pub fn max_turns(&self) -> usize {
        self.core.max_turns
    }

    pub fn max_message_history(&self) -> usize {
        self.core.max_message_history
    }

    /// Run on the agent's own memory.
    pub async fn run(&mut self, input: impl Into<AgentInput>) -> Result<AgentOutput> {
        self.run_with(RunOptions::new().with_input(input)).await
    }

    pub async fn run_with(&mut self, options: RunOptions) -> Result<AgentOutput> {
        engine::execute(&self.core, &mut self.memory, &mut self.stats, options).await
    }

    /// Run against a caller-owned memory, such as a council's minutes.
    pub async fn run_on(&mut self, memory: &mut Memory, options: RunOptions) -> Result<AgentOutput> {
        engine::execute(&self.core, memory, &mut self.stats, options).await
    }

    /// Continue a run from a persisted snapshot.
    ///
    /// The snapshot's messages replace the agent's memory and execution
    /// resumes at `data.step + 1`. Options left unset fall back to the
    /// snapshot's input, context and configuration.
    pub async fn recover(&mut self, data: RecoveryData, mut options: RunOptions) -> Result<AgentOutput> {
        if data.messages.is_empty() {
            return Err(CuriaError::InvalidState(
                "recovery data contains no messages".into(),
            ));
        }

        let info = data.info();
        info!(
            agent = %self.core.name,
            step = info.current_step,
            messages = info.message_count,
            "Recovering agent run"
        );
        self.core.events.emit(AgentEvent::Log {
            agent: self.core.name.clone(),
            message: format!(
                "Recovering from step {} with {} messages",
                info.current_step, info.message_count
            ),
        });

        self.memory.replace_all(data.messages);
        if options.input.is_none() {
            options.input = data.input;
        }
        if options.context.is_null() {
            options.context = data.context;
        }
        options.llm_config = data.llm_config.merged_with(&options.llm_config);
        options.start_step = data.step + 1;

        self.run_with(options).await
    }

    /// Wrap this agent as a tool another agent can call.
    pub fn as_tool(&self) -> Arc<dyn Tool> {
        Arc::new(AgentAsTool::new(self.core.clone()))
    }

    pub fn add_tool(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        self.core.tools.register(tool)
    }

    pub fn remove_tool(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.core.tools.remove(name)
    }

    /// Snapshot of the registered tools.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.core.tools.tools().to_vec()
    }

    /// Counters of the latest run.
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    pub fn events(&self) -> &AgentEvents {
        &self.core.events
    }

    pub fn on(
        &self,
        kind: AgentEventKind,
        listener: impl Fn(&AgentEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.core.events.on(kind, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.core.events.off(id)
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }
}
