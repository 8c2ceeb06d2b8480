//! curia CLI binary entry point.

use std::sync::Arc;

use clap::Parser;
use curia::agent::{Agent, AgentEvent, AgentEventKind};
use curia::cli::{Cli, Commands, CouncilArgs, ModelArgs, RunArgs};
use curia::config::{CuriaConfig, Settings};
use curia::council::Council;
use curia::provider::{create_default_provider, ModelProvider};
use curia::types::{AgentOutput, LlmConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match load_settings(cli.settings.as_deref()) {
        Ok(settings) => match cli.command {
            Commands::Run(args) => handle_run(args, &settings).await,
            Commands::Council(args) => handle_council(args, &settings).await,
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_settings(path: Option<&std::path::Path>) -> curia::error::Result<Settings> {
    match path {
        Some(path) => Settings::load(path),
        None => Settings::load_default(),
    }
}

fn provider_for(args: &ModelArgs) -> curia::error::Result<Arc<dyn ModelProvider>> {
    let config = CuriaConfig::from_env();
    if let Some(model) = &args.model {
        config.set_model(model.clone());
    }
    Ok(Arc::new(create_default_provider(&config)?))
}

fn llm_config_for(args: &ModelArgs, settings: &Settings) -> LlmConfig {
    let mut config = settings.llm.clone();
    if let Some(t) = args.temperature {
        config.temperature = Some(t);
    }
    if let Some(max) = args.max_tokens {
        config.max_tokens = Some(max);
    }
    config
}

fn print_output(output: &AgentOutput) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        AgentOutput::Text(text) => println!("{text}"),
        AgentOutput::Structured(value) => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

async fn handle_run(args: RunArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let provider = provider_for(&args.model)?;
    let mut agent = Agent::new(&args.name, &args.instructions, provider)
        .with_settings(settings)
        .with_llm_config(llm_config_for(&args.model, settings));
    if let Some(max_turns) = args.max_turns {
        agent = agent.with_max_turns(max_turns);
    }

    agent.on(AgentEventKind::ToolCallStart, |event| {
        if let AgentEvent::ToolCallStart { name, .. } = event {
            eprintln!("-> {name}");
        }
    });

    let output = agent.run(args.prompt).await?;
    print_output(&output)
}

async fn handle_council(
    args: CouncilArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let provider = provider_for(&args.model)?;
    let llm_config = llm_config_for(&args.model, settings);

    let senators = args
        .senators
        .iter()
        .map(|(name, instructions)| {
            Agent::new(name, instructions, provider.clone())
                .with_settings(settings)
                .with_llm_config(llm_config.clone())
        })
        .collect();

    let mut council = Council::new("cli", senators, provider.clone(), provider)?.with_settings(settings);
    if let Some(max_rounds) = args.max_rounds {
        council = council.with_max_rounds(max_rounds);
    }

    let output = council.run(args.prompt).await?;
    print_output(&output)
}
