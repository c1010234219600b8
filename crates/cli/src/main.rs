//! Fisibot CLI, the main entry point.
//!
//! Commands:
//! - `serve`   Start the HTTP tutor server
//! - `chat`    Interactive or single-question tutoring in the terminal
//! - `search`  Query the document index directly
//! - `doctor`  Diagnose configuration and backends
//! - `config`  Inspect or initialize the configuration file

use clap::{Parser, Subcommand};

mod commands;
mod runtime;

#[derive(Parser)]
#[command(
    name = "fisibot",
    about = "Fisibot: tutor de Física I con recuperación de documentos",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP tutor server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// Ask the tutor from the terminal
    Chat {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Search the document index without calling the model
    Search {
        /// Text to search for
        query: String,

        /// Number of fragments to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Diagnose configuration and backends
    Doctor,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate the effective configuration
    Validate,
    /// Print the effective configuration with secrets redacted
    Show,
    /// Write a default fisibot.toml in the current directory
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Search { query, top_k } => commands::search::run(&query, top_k).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config { action } => match action {
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Init => commands::config_cmd::init().await?,
        },
    }

    Ok(())
}
