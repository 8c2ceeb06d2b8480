//! Middleware chains around tool execution.

use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolContext};
use crate::error::CuriaError;
use crate::schema::validate_value;

/// A step in a tool's middleware chain.
///
/// Implementations may inspect or rewrite the arguments before calling
/// [`Next::run`], post-process its result, or short-circuit by returning
/// without calling it.
#[async_trait]
pub trait ToolMiddleware: Send + Sync {
    async fn handle(
        &self,
        args: ToolArguments,
        ctx: &ToolContext,
        next: Next<'_>,
    ) -> Result<serde_json::Value, CuriaError>;
}

/// Continuation for the rest of a middleware chain.
pub struct Next<'a> {
    tool: &'a dyn Tool,
    remaining: &'a [Arc<dyn ToolMiddleware>],
    ctx: &'a ToolContext,
}

impl<'a> Next<'a> {
    pub(crate) fn new(tool: &'a dyn Tool, ctx: &'a ToolContext) -> Self {
        Self {
            tool,
            remaining: tool.middlewares(),
            ctx,
        }
    }

    /// The tool at the end of the chain.
    pub fn tool(&self) -> &'a dyn Tool {
        self.tool
    }

    /// Run the remaining middlewares, then the tool itself.
    pub async fn run(self, args: ToolArguments) -> Result<serde_json::Value, CuriaError> {
        match self.remaining.split_first() {
            Some((middleware, rest)) => {
                let next = Next {
                    tool: self.tool,
                    remaining: rest,
                    ctx: self.ctx,
                };
                middleware.handle(args, self.ctx, next).await
            }
            None => self.tool.execute(args, self.ctx).await,
        }
    }
}

/// Rejects arguments that do not match the tool's declared parameters.
///
/// Dispatch itself never validates; attach this to tools that want it.
pub struct ValidateArguments;

#[async_trait]
impl ToolMiddleware for ValidateArguments {
    async fn handle(
        &self,
        args: ToolArguments,
        _ctx: &ToolContext,
        next: Next<'_>,
    ) -> Result<serde_json::Value, CuriaError> {
        validate_value(args.raw(), &next.tool().parameters().schema)
            .map_err(CuriaError::InvalidArgument)?;
        next.run(args).await
    }
}

/// Execute `tool` through its middleware chain.
///
/// With no middlewares the tool is executed directly.
pub async fn apply_middleware(
    tool: &dyn Tool,
    args: ToolArguments,
    ctx: &ToolContext,
) -> Result<serde_json::Value, CuriaError> {
    Next::new(tool, ctx).run(args).await
}
