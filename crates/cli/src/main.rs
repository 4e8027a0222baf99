//! Confab CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Initialize config & data directory
//! - `chat`     — Interactive chat or single-message mode
//! - `topics`   — List saved conversation topics
//! - `gateway`  — Start the HTTP API server
//! - `doctor`   — Diagnose local setup

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "confab",
    about = "Confab — a local conversational assistant that remembers",
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
    /// Initialize configuration and the data directory
    Onboard,

    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Synthesize spoken replies
        #[arg(long)]
        voice: bool,
    },

    /// List saved conversation topics
    Topics,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Diagnose local setup
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message, voice } => commands::chat::run(message, voice).await?,
        Commands::Topics => commands::topics::run().await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
