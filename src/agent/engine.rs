//! The agent step engine.
//!
//! One run is an explicit loop over steps. Step 0 builds the system prompt
//! and appends the input. Whenever the memory carries earlier history the
//! history bound is enforced before the model call. Each
//! step makes one model call and then either finishes with the model's
//! answer, fails on a stalled response, or dispatches the requested tool
//! calls and continues.

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::agent::AgentCore;
use super::events::AgentEvent;
use super::persistence::PersistenceParams;
use super::prompt::compose_system_prompt;
use super::stats::{ExecutionStats, RunStatus};
use crate::error::{CuriaError, Result};
use crate::memory::Memory;
use crate::output::extract_json_object;
use crate::provider::ChatRequest;
use crate::tools::{dispatch_tool_calls, ToolContext};
use crate::types::{AgentInput, AgentOutput, LlmConfig, Message};

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub input: Option<AgentInput>,
    /// Caller context forwarded to every tool call.
    pub context: Value,
    /// Overrides layered over the agent's default configuration.
    pub llm_config: LlmConfig,
    pub cancel: CancellationToken,
    pub(crate) start_step: usize,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: impl Into<AgentInput>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    pub fn with_llm_config(mut self, llm_config: LlmConfig) -> Self {
        self.llm_config = llm_config;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn start_step(&self) -> usize {
        self.start_step
    }
}

/// Run `core` against `memory` until it completes, fails or is aborted.
///
/// `stats` is reset at entry and left holding the final counters.
pub(crate) async fn execute(
    core: &AgentCore,
    memory: &mut Memory,
    stats: &mut ExecutionStats,
    mut options: RunOptions,
) -> Result<AgentOutput> {
    *stats = ExecutionStats::new(Uuid::new_v4());
    let input_value = options
        .input
        .as_ref()
        .map(AgentInput::to_value)
        .unwrap_or(Value::Null);

    core.events.emit(AgentEvent::Start {
        agent: core.name.clone(),
        input: input_value,
        context: options.context.clone(),
    });
    info!(agent = %core.name, run_id = %stats.run_id, start_step = options.start_step, "Agent run started");

    let outcome = match validate_input(core, &mut options) {
        Ok(()) => run_steps(core, memory, stats, &options).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(output) => {
            stats.finish(RunStatus::Completed);
            info!(
                agent = %core.name,
                run_id = %stats.run_id,
                steps = stats.current_step + 1,
                llm_calls = stats.llm_calls,
                tool_calls = stats.tool_calls,
                "Agent run completed"
            );
            core.events.emit(AgentEvent::Completed {
                output: output.clone(),
                stats: stats.clone(),
            });
            Ok(output)
        }
        Err(CuriaError::Aborted) => {
            stats.errors.push(CuriaError::Aborted.to_string());
            stats.finish(RunStatus::Aborted);
            core.events.log(&core.name, "Execution aborted");
            core.events.emit(AgentEvent::Aborted {
                stats: stats.clone(),
            });
            Err(CuriaError::Aborted)
        }
        Err(err) => {
            stats.errors.push(err.to_string());
            stats.finish(RunStatus::Failed);
            core.events.emit(AgentEvent::Error {
                agent: core.name.clone(),
                message: err.to_string(),
                stats: Some(stats.clone()),
            });
            Err(err)
        }
    }
}

fn validate_input(core: &AgentCore, options: &mut RunOptions) -> Result<()> {
    let (Some(schema), Some(AgentInput::Structured(value))) =
        (core.input_schema.as_ref(), options.input.as_ref())
    else {
        return Ok(());
    };
    let parsed = schema
        .safe_parse(value)
        .map_err(|e| CuriaError::InvalidArgument(format!("input does not match schema: {e}")))?;
    options.input = Some(AgentInput::Structured(parsed));
    Ok(())
}

async fn run_steps(
    core: &AgentCore,
    memory: &mut Memory,
    stats: &mut ExecutionStats,
    options: &RunOptions,
) -> Result<AgentOutput> {
    let llm_config = LlmConfig::engine_defaults()
        .merged_with(&core.llm_config)
        .merged_with(&options.llm_config);
    let mut step = options.start_step;

    loop {
        if options.cancel.is_cancelled() {
            return Err(CuriaError::Aborted);
        }
        if step >= core.max_turns {
            return Err(CuriaError::MaxTurnsExceeded(core.max_turns));
        }
        stats.current_step = step;

        let carried_history = step > 0 || memory.len() > 1;
        if step == 0 {
            let prompt = compose_system_prompt(
                &core.instructions,
                core.description.as_deref(),
                core.output_schema.as_deref(),
                core.provider.response_format(),
            );
            memory.replace_system_message(prompt);
            if let Some(input) = &options.input {
                memory.add([Message::user(input.to_message_content())]);
            }
            persist(core, memory, step, options, &llm_config).await;
        }
        if carried_history && core.enable_message_compression {
            let original_count = memory.len();
            memory.arrange(core.compression.as_ref());
            if memory.len() != original_count {
                stats.compressed_messages += 1;
                core.events.emit(AgentEvent::MessageCompressed {
                    original_count,
                    compressed_count: memory.len(),
                });
            }
        }

        core.events.emit(AgentEvent::StatsUpdate {
            step,
            stats: stats.clone(),
        });

        let request = ChatRequest {
            messages: memory.messages().to_vec(),
            tools: core.tools.definitions(),
            response_format: core.provider.response_format(),
            config: llm_config.clone(),
        };
        core.events.emit(AgentEvent::LlmCallStart {
            step,
            message_count: request.messages.len(),
        });
        debug!(
            agent = %core.name,
            step,
            provider = core.provider.provider_name(),
            model = core.provider.model_id(),
            messages = request.messages.len(),
            "Calling model"
        );

        let response = core.provider.complete(&request).await;
        stats.llm_calls += 1;
        let response = response?;
        stats.total_tokens += u64::from(response.usage.total_tokens);
        core.events.emit(AgentEvent::LlmCallEnd {
            step,
            usage: response.usage.clone(),
        });

        let message = response.choice.ok_or(CuriaError::NoChoices)?;
        memory.add([message.clone()]);
        persist(core, memory, step, options, &llm_config).await;

        if !message.content.trim().is_empty() {
            return interpret_final(core, &message.content);
        }
        if !message.has_tool_calls() {
            return Err(CuriaError::EmptyResponse);
        }

        if options.cancel.is_cancelled() {
            return Err(CuriaError::Aborted);
        }
        let calls = message.tool_calls;
        stats.tool_calls += calls.len();
        core.events.log(
            &core.name,
            format!("Step {step}: dispatching {} tool call(s)", calls.len()),
        );

        let ctx = ToolContext::new(&core.name, options.context.clone(), options.cancel.clone());
        let outcomes = dispatch_tool_calls(&core.tools, &calls, &ctx, &core.events).await;
        for outcome in &outcomes {
            if outcome.succeeded {
                stats.tool_calls_completed += 1;
            } else {
                stats.tool_calls_failed += 1;
            }
        }
        memory.add(outcomes.into_iter().map(|outcome| outcome.message));
        persist(core, memory, step, options, &llm_config).await;

        step += 1;
    }
}

fn interpret_final(core: &AgentCore, content: &str) -> Result<AgentOutput> {
    let Some(schema) = &core.output_schema else {
        return Ok(AgentOutput::Text(content.to_string()));
    };
    let value = extract_json_object(content).ok_or_else(|| {
        CuriaError::OutputExtraction("no JSON object found in the final response".into())
    })?;
    let parsed = schema.safe_parse(&value).map_err(CuriaError::OutputValidation)?;
    Ok(AgentOutput::Structured(parsed))
}

async fn persist(
    core: &AgentCore,
    memory: &Memory,
    step: usize,
    options: &RunOptions,
    llm_config: &LlmConfig,
) {
    let Some(hook) = &core.persistence else {
        return;
    };
    let params = PersistenceParams {
        agent: core.name.clone(),
        messages: memory.messages().to_vec(),
        step,
        input: options
            .input
            .as_ref()
            .map(AgentInput::to_value)
            .unwrap_or(Value::Null),
        context: options.context.clone(),
        llm_config: llm_config.clone(),
    };
    if let Err(err) = hook(params).await {
        core.events
            .warn(&core.name, format!("Failed to persist history at step {step}: {err}"));
    }
}
