//! An agent exposed through the [`Tool`] contract.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::agent::AgentCore;
use super::engine::{self, RunOptions};
use super::stats::ExecutionStats;
use crate::error::CuriaError;
use crate::memory::Memory;
use crate::tools::{Tool, ToolArguments, ToolContext, ToolParameters};
use crate::types::{AgentInput, AgentOutput};
use crate::util::normalize_name;

/// Delegation wrapper: each call runs the agent on a fresh memory.
pub struct AgentAsTool {
    core: AgentCore,
    name: String,
    description: String,
    parameters: ToolParameters,
    returns: ToolParameters,
}

impl AgentAsTool {
    pub(crate) fn new(core: AgentCore) -> Self {
        let description = [core.instructions.as_str(), core.description.as_deref().unwrap_or("")]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        let parameters = core
            .input_schema
            .as_ref()
            .map(|schema| ToolParameters::from_schema(schema.json_schema()))
            .unwrap_or_else(ToolParameters::prompt_envelope);
        let returns = core
            .output_schema
            .as_ref()
            .map(|schema| ToolParameters::from_schema(schema.json_schema()))
            .unwrap_or_else(ToolParameters::content_envelope);

        Self {
            name: normalize_name(&core.name),
            description,
            parameters,
            returns,
            core,
        }
    }

    fn input_from(&self, args: ToolArguments) -> AgentInput {
        if self.core.input_schema.is_none() {
            if let Some(prompt) = args.get_str_opt("prompt") {
                return AgentInput::Text(prompt.to_string());
            }
        }
        AgentInput::Structured(args.into_value())
    }
}

#[async_trait]
impl Tool for AgentAsTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    fn returns(&self) -> Option<&ToolParameters> {
        Some(&self.returns)
    }

    async fn execute(&self, args: ToolArguments, ctx: &ToolContext) -> Result<Value, CuriaError> {
        let input = self.input_from(args);
        let mut memory = Memory::new(&self.core.name, &self.core.instructions)
            .with_max_history(self.core.max_message_history);
        let mut stats = ExecutionStats::default();
        let options = RunOptions::new()
            .with_input(input)
            .with_context(ctx.context.clone())
            .with_cancel(ctx.cancel.clone());

        let output = engine::execute(&self.core, &mut memory, &mut stats, options).await?;
        Ok(match output {
            AgentOutput::Text(content) => json!({ "content": content }),
            AgentOutput::Structured(value) => value,
        })
    }
}
