#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use command::{ChatInput, ChatStrategy, CommandStrategy, InitStrategy, VersionStrategy};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod command;

#[derive(Parser)]
#[command(name = "askdoc")]
#[command(about = "askdoc document question answering client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a conversation with the answering backend
    Chat {
        /// Single question to send (non-interactive mode)
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Enable web search for this session
        #[arg(short = 'w', long)]
        websearch: bool,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { message, websearch } => {
            ChatStrategy
                .execute(ChatInput { message, websearch })
                .await?;
        }
        Commands::Init => {
            InitStrategy.execute(()).await?;
        }
        Commands::Version => {
            VersionStrategy.execute(()).await?;
        }
    }

    Ok(())
}
