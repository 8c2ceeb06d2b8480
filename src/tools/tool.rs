//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use super::arguments::ToolArguments;
use super::middleware::ToolMiddleware;
use super::types::ToolParameters;
use crate::error::CuriaError;
use crate::util::normalize_name;

/// Context available during tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Name of the agent dispatching the call.
    pub agent: String,
    /// Caller-supplied run context, forwarded unchanged.
    pub context: serde_json::Value,
    pub tool_call_id: Option<String>,
    pub tool_name: Option<String>,
    /// Cancellation signal of the run that issued the call.
    pub cancel: CancellationToken,
}

impl ToolContext {
    pub fn new(
        agent: impl Into<String>,
        context: serde_json::Value,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            agent: agent.into(),
            context,
            cancel,
            ..Self::default()
        }
    }

    pub(crate) fn for_call(&self, call_id: &str, name: &str) -> Self {
        Self {
            tool_call_id: Some(call_id.to_string()),
            tool_name: Some(name.to_string()),
            ..self.clone()
        }
    }
}

/// A named callable the model may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments.
    fn parameters(&self) -> &ToolParameters;

    /// JSON Schema of the result, if declared.
    fn returns(&self) -> Option<&ToolParameters> {
        None
    }

    /// Middlewares run around [`Tool::execute`], outermost first.
    fn middlewares(&self) -> &[Arc<dyn ToolMiddleware>] {
        &[]
    }

    /// Per-call timeout.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Execute the tool with (possibly middleware-transformed) arguments.
    async fn execute(
        &self,
        args: ToolArguments,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, CuriaError>;
}

type ToolHandler = dyn Fn(ToolArguments, ToolContext) -> BoxFuture<'static, Result<serde_json::Value, CuriaError>>
    + Send
    + Sync;

/// Closure-based tool.
pub struct NativeTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    returns: Option<ToolParameters>,
    middlewares: Vec<Arc<dyn ToolMiddleware>>,
    timeout: Option<Duration>,
    handler: Arc<ToolHandler>,
}

impl NativeTool {
    /// Create a tool from a closure. The name is normalized.
    pub fn new<F, Fut>(
        name: impl AsRef<str>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, CuriaError>> + Send + 'static,
    {
        Self {
            name: normalize_name(name.as_ref()),
            description: description.into(),
            parameters,
            returns: None,
            middlewares: Vec::new(),
            timeout: None,
            handler: Arc::new(move |args, ctx| Box::pin(handler(args, ctx))),
        }
    }

    pub fn with_returns(mut self, returns: ToolParameters) -> Self {
        self.returns = Some(returns);
        self
    }

    /// Append a middleware; the first added runs outermost.
    pub fn with_middleware(mut self, middleware: impl ToolMiddleware + 'static) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl Tool for NativeTool {
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
        self.returns.as_ref()
    }

    fn middlewares(&self) -> &[Arc<dyn ToolMiddleware>] {
        &self.middlewares
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn execute(
        &self,
        args: ToolArguments,
        ctx: &ToolContext,
    ) -> Result<serde_json::Value, CuriaError> {
        (self.handler)(args, ctx.clone()).await
    }
}

impl std::fmt::Debug for NativeTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("middlewares", &self.middlewares.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
