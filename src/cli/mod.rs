//! CLI entry point for curia.

use clap::{Parser, Subcommand};

/// curia agent runner
#[derive(Parser, Debug)]
#[command(name = "curia", version, about = "Run curia agents and councils from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to ~/.curia/settings.toml)
    #[arg(long, global = true)]
    pub settings: Option<std::path::PathBuf>,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single agent on a prompt
    Run(RunArgs),
    /// Convene a council of senators on a prompt
    Council(CouncilArgs),
}

/// Model selection shared by every command.
#[derive(Parser, Debug)]
pub struct ModelArgs {
    /// Model id (defaults to CURIA_MODEL, then google/gemini-2.5-flash)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max tokens per model call
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

/// Arguments for `curia run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Agent name
    #[arg(long, default_value = "Assistant")]
    pub name: String,

    /// Agent instructions
    #[arg(short, long, default_value = "You are a helpful assistant.")]
    pub instructions: String,

    /// Step budget
    #[arg(long)]
    pub max_turns: Option<usize>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// User prompt
    pub prompt: String,
}

/// Arguments for `curia council`.
#[derive(Parser, Debug)]
pub struct CouncilArgs {
    /// Senator as `Name=instructions` (repeatable)
    #[arg(short, long = "senator", required = true, value_parser = parse_senator)]
    pub senators: Vec<(String, String)>,

    /// Round budget
    #[arg(long)]
    pub max_rounds: Option<usize>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// User prompt
    pub prompt: String,
}

fn parse_senator(raw: &str) -> Result<(String, String), String> {
    let (name, instructions) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Name=instructions, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("senator name must not be empty".into());
    }
    Ok((name.to_string(), instructions.trim().to_string()))
}
