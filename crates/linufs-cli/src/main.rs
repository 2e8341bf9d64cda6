//! linufs command line.
//!
//! Opens the configured node store once and runs a command against it.
//!
//! ## Usage
//!
//! ```bash
//! # Local backend with the demo entries
//! linufs tree
//!
//! # Remote backend from a RON config
//! linufs --config linufs.ron ls /
//!
//! # Several commands against the same store
//! linufs run setup.lfs
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use linufs_kernel::{StoreConfig, open_store};

use crate::commands::Command;

/// Node store command line.
#[derive(Parser, Debug)]
#[command(name = "linufs")]
#[command(about = "Run commands against a linufs node store")]
struct Args {
    /// RON configuration file (defaults to the local backend)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Access token, overriding the configured one
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(token) = args.token {
        config.token = token;
    }

    let store = open_store(&config)?;
    store.initialize(&config.token).await?;

    let mut stdout = std::io::stdout().lock();
    commands::execute(store.as_ref(), &args.command, &mut stdout).await
}
