//! ebisu - conversational sales-prospect research agent

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;

use commands::{chat_command, init_command, status_command};

/// ebisu - prospect research in your terminal
#[derive(Parser)]
#[command(name = "ebisu")]
#[command(about = "Conversational sales-prospect research agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config and data directories
    Init,
    /// Chat with the agent
    Chat {
        /// Message to send; omit for interactive mode
        #[arg(short, long)]
        message: Option<String>,
        /// Session key
        #[arg(short, long, default_value = "default")]
        session: String,
    },
    /// Show configuration and session status
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            if let Err(e) = init_command().await {
                error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Chat { message, session } => {
            if let Err(e) = chat_command(message, session).await {
                error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            if let Err(e) = status_command().await {
                error!("status failed: {}", e);
                std::process::exit(1);
            }
        }
    }
}
