use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "reelsmith")]
#[command(about = "Reelsmith - generate videos from prompts and keep them organized in sessions", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the reelsmith config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "reelsmith_application=debug" (RUST_LOG wins)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
    /// Generate videos for a prompt
    Generate(GenerateArgs),
    /// Show the generation history of a session, newest first
    History {
        /// Session id
        session: String,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// List sessions, oldest first
    List,
    /// Create a new session
    New {
        /// Display name (defaults to "Session <date time>")
        name: Option<String>,
    },
    /// Delete a session and its video files
    Delete {
        /// Session id
        id: String,
    },
    /// Rename a session
    Rename {
        /// Session id
        id: String,
        /// New display name
        name: String,
    },
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Session to record the generation in (a new session is created if omitted)
    #[arg(long)]
    session: Option<String>,

    /// Text prompt
    #[arg(long)]
    prompt: String,

    /// Aspect ratio, e.g. "16:9" or "9:16 (Portrait)"
    #[arg(long)]
    aspect_ratio: Option<String>,

    /// Model id or label, e.g. "veo-3.0-generate-preview" or "Veo 3 Fast"
    #[arg(long)]
    model: Option<String>,

    /// Number of variations (1-4)
    #[arg(long, default_value_t = 1)]
    variations: u32,

    /// Cloud storage URI of a reference image (gs://...)
    #[arg(long)]
    image_uri: Option<String>,

    /// MIME type of the reference image
    #[arg(long, default_value = "image/png")]
    image_mime: String,
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let ctx = commands::context::AppContext::load(cli.config).await?;

    match cli.command {
        Commands::Sessions { action } => match action {
            SessionsAction::List => commands::sessions::list(&ctx).await?,
            SessionsAction::New { name } => commands::sessions::create(&ctx, name.as_deref()).await?,
            SessionsAction::Delete { id } => commands::sessions::delete(&ctx, &id).await?,
            SessionsAction::Rename { id, name } => commands::sessions::rename(&ctx, &id, &name).await?,
        },
        Commands::Generate(args) => commands::generate::run(&ctx, args).await?,
        Commands::History { session } => commands::history::show(&ctx, &session).await?,
    }

    Ok(())
}
