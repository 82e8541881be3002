//! Tagbot CLI — the main entry point.
//!
//! Commands:
//! - `init`    — Write a default config and a sample tags file
//! - `tag`     — Run `/tag` locally against the configured tag store
//! - `suggest` — Show autocomplete choices for a fragment
//! - `serve`   — Answer Discord interactions read as JSON lines
//! - `doctor`  — Diagnose configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tagbot",
    about = "Tagbot — the /tag chat command",
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
    /// Initialize configuration and a sample tags file
    Init,

    /// Display a tag as if `/tag` was used in a channel
    Tag {
        /// The id of the tag to display
        id: String,

        /// Name of the channel the command is used in
        #[arg(short, long, default_value = "bot-commands")]
        channel: String,

        /// Treat the channel as a thread of this parent channel
        #[arg(long)]
        thread_of: Option<String>,

        /// Roles held by the invoking member (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,

        /// User to mention, as `ID` or `ID:NAME`
        #[arg(long)]
        reply_to: Option<String>,
    },

    /// Show autocomplete choices for a partial tag id
    Suggest {
        /// What has been typed so far
        #[arg(default_value = "")]
        fragment: String,
    },

    /// Answer interactions read as JSON lines from stdin
    Serve,

    /// Diagnose configuration
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Tag {
            id,
            channel,
            thread_of,
            roles,
            reply_to,
        } => {
            let request = commands::tag::TagRequest {
                id,
                channel,
                thread_of,
                roles,
                reply_to,
            };
            commands::tag::run(request).await?
        }
        Commands::Suggest { fragment } => commands::suggest::run(&fragment).await?,
        Commands::Serve => commands::serve::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
