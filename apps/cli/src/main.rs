//! aceup command-line entry point.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aceup", version, about = "Upload files and folders to MirrorAce")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload files or folders.
    Upload {
        /// Paths to files or folders.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Password required to download.
        #[arg(long)]
        password: Option<String>,
        /// Print bare URLs only, for shell piping.
        #[arg(long)]
        urls_only: bool,
    },
    /// Upload every entry of the given folders.
    Folder {
        /// Folders whose entries are uploaded one by one.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Password required to download.
        #[arg(long)]
        password: Option<String>,
    },
    /// Submit remote URLs for the service to mirror.
    Remote {
        /// URLs to submit.
        #[arg(required = true)]
        urls: Vec<String>,
        /// Password required to download.
        #[arg(long)]
        password: Option<String>,
    },
    /// Show info for uploaded file slugs.
    Info {
        /// Slugs to look up.
        #[arg(required = true)]
        slugs: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::Config::load()?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(commands::run(cli.command, config))
}
