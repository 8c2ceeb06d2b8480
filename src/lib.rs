//! curia: an execution engine for tool-using LLM agents.
//!
//! An [`Agent`](agent::Agent) repeatedly calls a model provider, dispatches
//! the tool calls it requests and decides when the task is finished. A
//! [`Council`](council::Council) orchestrates several agents turn by turn.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use curia::prelude::*;
//!
//! # async fn example() -> curia::error::Result<()> {
//! let config = CuriaConfig::from_env();
//! let provider = Arc::new(curia::provider::create_default_provider(&config)?);
//! let mut agent = Agent::new("Assistant", "You are a helpful assistant.", provider);
//! let output = agent.run("Hello!").await?;
//! println!("{output}");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod council;
pub mod error;
pub mod memory;
pub mod output;
pub mod prelude;
pub mod provider;
pub mod schema;
pub mod tools;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
