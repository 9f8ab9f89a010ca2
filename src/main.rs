//! Agent Starter - command line entry point.
//!
//! `serve` (the default) runs the HTTP API, `chat` opens a terminal
//! conversation with the same agent, `validate` checks the template has been
//! customized.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use agent_starter::api::{self, DiscoveryDocument};
use agent_starter::config::{ConfigError, DEFAULT_CONFIG_PATH, DEFAULT_DISCOVERY_PATH};
use agent_starter::{build_agent, chat, logging, tools, validate, Settings};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "agent-starter", version, about = "Gemini agent server and terminal chat")]
struct Cli {
    /// Path to the agent settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Path to the A2A discovery document
    #[arg(long, global = true, default_value = DEFAULT_DISCOVERY_PATH)]
    discovery: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Run the production HTTP server (default)
    Serve,
    /// Chat with the agent in the terminal
    Chat,
    /// Check that the template has been customized
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Values already in the environment take precedence over .env.
    dotenvy::dotenv().ok();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli).await,
        Command::Chat => {
            let settings = load_settings(&cli)?;
            let agent = build_agent(&settings, tools::default_tools());
            chat::run(&agent, settings.agent_display_name()).await
        }
        Command::Validate => {
            let results = validate::run_checks(
                Path::new("."),
                &cli.config,
                &cli.discovery,
                tools::default_tools().len(),
            );
            let passed = validate::report(&results);
            std::process::exit(if passed { 0 } else { 1 });
        }
    }
}

async fn serve(cli: &Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli)?;
    let discovery = DiscoveryDocument::load(&cli.discovery).map_err(fatal_config_error)?;

    let agent = Arc::new(build_agent(&settings, tools::default_tools()));
    info!(tools = agent.tools().len(), "Agent assembled");

    api::serve(&settings, agent, discovery).await
}

/// Load settings and start logging. Configuration errors abort startup.
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let settings = Settings::load_from(&cli.config, |key| std::env::var(key).ok())
        .map_err(fatal_config_error)?;

    logging::init(&settings.log_level);
    info!(
        agent = %settings.agent_name(),
        model = %settings.model_id(),
        "Loaded configuration"
    );
    Ok(settings)
}

/// Print the startup checklist and hand the error back to abort startup.
fn fatal_config_error(err: ConfigError) -> anyhow::Error {
    let rule = "=".repeat(70);
    eprintln!("\n{}", rule);
    eprintln!("FATAL ERROR: Could not load configuration");
    eprintln!("{}", rule);
    eprintln!("\nPlease check:");
    eprintln!("  1. .env file exists (copy from .env.example)");
    eprintln!("  2. GEMINI_API_KEY is set in .env or the environment");
    eprintln!("  3. {} exists and is valid", DEFAULT_CONFIG_PATH);
    eprintln!("  4. {} exists and is valid JSON", DEFAULT_DISCOVERY_PATH);
    eprintln!("\nError details:\n  {}", err);
    eprintln!("{}\n", rule);
    err.into()
}
