//! Converts model-issued tool calls into tool-result messages.
//!
//! Nothing here fails past its own boundary: unknown tools, bad arguments,
//! handler errors and timeouts all become `"Error: ..."` tool messages.

use futures::future::join_all;
use serde_json::Value;
use tracing::debug;

use super::arguments::ToolArguments;
use super::middleware::apply_middleware;
use super::registry::ToolRegistry;
use super::tool::{Tool, ToolContext};
use crate::agent::events::{AgentEvent, AgentEvents};
use crate::error::CuriaError;
use crate::types::{Message, ToolCall};
use crate::util::with_timeout;

/// Result of one dispatched tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallOutcome {
    /// The `tool` role message to append to memory.
    pub message: Message,
    pub succeeded: bool,
}

/// Execute one tool call.
pub async fn execute_tool_call(
    registry: &ToolRegistry,
    call: &ToolCall,
    ctx: &ToolContext,
    events: &AgentEvents,
) -> ToolCallOutcome {
    let name = call.name();
    let Some(tool) = registry.get(name) else {
        events.warn(
            &ctx.agent,
            format!("LLM requested unknown tool: {name}"),
        );
        return failed(call, format!("Unknown tool {name}"));
    };

    events.emit(AgentEvent::ToolCallStart {
        name: name.to_string(),
        arguments: call.function.arguments.clone(),
    });

    let call_ctx = ctx.for_call(&call.id, name);
    match run_tool(tool.as_ref(), &call.function.arguments, &call_ctx).await {
        Ok(result) => {
            events.log(&ctx.agent, format!("Tool \"{name}\" executed successfully."));
            let content = render_result(&result);
            events.emit(AgentEvent::ToolCallEnd {
                name: name.to_string(),
                result,
            });
            ToolCallOutcome {
                message: Message::tool_result(&call.id, name, content),
                succeeded: true,
            }
        }
        Err(err) => {
            events.emit(AgentEvent::ToolCallError {
                name: name.to_string(),
                error: err.to_string(),
            });
            events.error(&ctx.agent, format!("Tool \"{name}\" execution failed: {err}"));
            failed(call, err.to_string())
        }
    }
}

/// Execute every call concurrently. Outcomes keep the order of `calls`.
pub async fn dispatch_tool_calls(
    registry: &ToolRegistry,
    calls: &[ToolCall],
    ctx: &ToolContext,
    events: &AgentEvents,
) -> Vec<ToolCallOutcome> {
    join_all(
        calls
            .iter()
            .map(|call| execute_tool_call(registry, call, ctx, events)),
    )
    .await
}

async fn run_tool(tool: &dyn Tool, raw_args: &str, ctx: &ToolContext) -> Result<Value, CuriaError> {
    if ctx.cancel.is_cancelled() {
        return Err(CuriaError::Aborted);
    }

    let args = ToolArguments::from_model_text(raw_args);

    match tool.timeout() {
        Some(limit) => with_timeout(limit, apply_middleware(tool, args, ctx)).await,
        None => apply_middleware(tool, args, ctx).await,
    }
}

/// Strings pass through as-is; everything else is serialized.
fn render_result(result: &Value) -> String {
    match result {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn failed(call: &ToolCall, message: String) -> ToolCallOutcome {
    debug!(tool = %call.name(), call_id = %call.id, error = %message, "Tool call failed");
    ToolCallOutcome {
        message: Message::tool_result(&call.id, call.name(), format!("Error: {message}")),
        succeeded: false,
    }
}
