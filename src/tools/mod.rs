//! Tool system for function calling.

pub mod arguments;
pub mod dispatch;
pub mod middleware;
pub mod registry;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use dispatch::{dispatch_tool_calls, execute_tool_call, ToolCallOutcome};
pub use middleware::{apply_middleware, Next, ToolMiddleware, ValidateArguments};
pub use registry::ToolRegistry;
pub use tool::{NativeTool, Tool, ToolContext};
pub use types::{ParameterBuilder, ToolDefinition, ToolParameters};
