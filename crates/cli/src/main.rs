//! Floorwise CLI
//!
//! Main entry point for the floorwise command-line tool.
//! Answers flooring product questions from the terminal or over HTTP.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, FiltersCommand, PromptsCommand, ServeCommand};
use floorwise_core::logging::{self, LogFormat};
use floorwise_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Floorwise - product Q&A over brochures and the product catalog
#[derive(Parser, Debug)]
#[command(name = "floorwise")]
#[command(about = "Product Q&A over flooring brochures and catalog data", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FLOORWISE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FLOORWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "FLOORWISE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "FLOORWISE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single question
    Ask(AskCommand),

    /// Answer one question per stdin line
    Chat(ChatCommand),

    /// Show the filters a question would be queried with
    Filters(FiltersCommand),

    /// List prompt definitions
    Prompts(PromptsCommand),

    /// Serve the HTTP and WebSocket endpoints
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // The server is long-running and usually shipped to a collector.
    let format = match &cli.command {
        Commands::Serve(_) => LogFormat::Json,
        _ => LogFormat::Pretty,
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::info!("Floorwise CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Filters(_) => "filters",
        Commands::Prompts(_) => "prompts",
        Commands::Serve(_) => "serve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Filters(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
