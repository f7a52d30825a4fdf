//! Lumina CLI
//!
//! Main entry point for the lumina command-line tool.
//! Answers questions with a generative provider, falling back to web
//! search providers when grounded answering fails.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ConfigCommand, TitleCommand};
use lumina_core::logging::{self, LogFormat};
use lumina_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit status for configuration faults (missing key, invalid settings).
const EXIT_CONFIG: u8 = 2;

/// Lumina - a cheerful assistant with honest, cited answers
#[derive(Parser, Debug)]
#[command(name = "lumina")]
#[command(about = "Conversational answers with grounded search and fallbacks", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question, optionally continuing a saved conversation
    Ask(AskCommand),

    /// Generate a short conversation title for a first message
    Title(TitleCommand),

    /// Print the effective configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Configuration faults exit with 2, everything else with 1.
fn exit_status(err: &AppError) -> u8 {
    if err.is_server_error() {
        EXIT_CONFIG
    } else {
        1
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load base configuration from defaults, file and environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let format = LogFormat::parse(&config.log_format).ok_or_else(|| {
        AppError::Config(format!("Unknown log format: {}", config.log_format))
    })?;
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::info!("Lumina CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Model: {}", config.gemini.model);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Title(_) => "title",
        Commands::Config(_) => "config",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Title(cmd) => cmd.execute(&config).await,
        Commands::Config(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
