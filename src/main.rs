mod commands;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coursesync_core::SyncConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coursesync")]
#[command(about = "Sync course assignments from a calendar feed into Notion")]
struct Cli {
    /// Config file (default: ~/.config/coursesync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the tasks a sync would create, without touching Notion
    Preview {
        /// Also write the plan as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Read the feed from a local .ics file instead of feed_url
        #[arg(long)]
        feed_file: Option<PathBuf>,
    },
    /// Create tasks in Notion for the feed's assignments
    Sync {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// Create every task without checking for existing ones
        #[arg(long)]
        always_create: bool,

        /// Read the feed from a local .ics file instead of feed_url
        #[arg(long)]
        feed_file: Option<PathBuf>,
    },
    /// List configured course → project mappings
    Courses,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Preview { output, feed_file } => {
            let config = load_config(cli.config.as_deref())?;
            commands::preview::run(&config, feed_file.as_deref(), output.as_deref()).await
        }
        Commands::Sync {
            json,
            always_create,
            feed_file,
        } => {
            let config = load_config(cli.config.as_deref())?;
            commands::sync::run(config, feed_file.as_deref(), always_create, json).await
        }
        Commands::Courses => {
            let config = load_config(cli.config.as_deref())?;
            commands::courses::run(&config)
        }
        Commands::Init { force } => commands::init::run(cli.config.as_deref(), force),
    }
}

/// Logs go to stderr so they never mix with preview or JSON output.
fn init_logging(verbose: bool) {
    let default = if verbose { "coursesync=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<SyncConfig> {
    SyncConfig::load(path).map_err(|e| {
        anyhow::anyhow!(
            "{e}\n\n\
            Create a config file with:\n  \
            coursesync init"
        )
    })
}
