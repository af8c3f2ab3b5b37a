//! # offsync
//!
//! Command-line host adapter for the offsync engine.
//!
//! Each invocation opens the SQLite cache, builds an engine from the
//! configuration, forwards one event and prints the outcome, including any
//! messages the engine sent to client contexts.
//!
//! ## Commands
//!
//! - `install`: Open buckets and precache assets
//! - `activate`: Delete stale buckets and reload clients
//! - `fetch`: Send a request through the engine
//! - `sync`: Fire a background sync trigger
//! - `push`: Deliver a push payload
//! - `click`: Simulate a notification click
//! - `message`: Deliver a host command from a client
//! - `buckets`: List cache buckets
//!
//! ## Example
//!
//! ```bash
//! # Install version from offsync.toml and precache assets
//! offsync install
//!
//! # Read through the cache
//! offsync fetch /main.js
//!
//! # Capture a write while offline
//! offsync --offline --client tab-1=http://localhost:8080/ \
//!     fetch /api/orders -X POST -H 'Content-Type: application/json' -d '{"sku":"A-1"}'
//!
//! # Tell clients to flush their queues
//! offsync --client tab-1=http://localhost:8080/ sync
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod host;

use commands::{activate, buckets, click, fetch, install, message, push, sync};
use config::Config;
use host::Host;

/// Command-line host adapter for the offsync engine.
#[derive(Parser, Debug)]
#[command(name = "offsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: offsync.toml if present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding the cache database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Report the network as offline
    #[arg(long, global = true)]
    offline: bool,

    /// Treat a client context as open (repeatable), as ID=URL
    #[arg(long = "client", global = true, value_parser = host::parse_client)]
    clients: Vec<(String, String)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the current buckets and precache configured assets
    Install,

    /// Delete stale buckets and reload open clients
    Activate,

    /// Send a request through the engine
    Fetch {
        /// URL or path (resolved against the configured origin)
        url: String,

        /// HTTP method
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,

        /// Request header as 'Name: value' (repeatable)
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,

        /// Request body
        #[arg(long, short)]
        data: Option<String>,

        /// Mark the request as a page navigation
        #[arg(long)]
        navigate: bool,

        /// Print response headers
        #[arg(long, short)]
        include: bool,
    },

    /// Fire a background sync trigger
    Sync {
        /// Sync tag (default: the configured tag)
        tag: Option<String>,
    },

    /// Deliver a push payload
    Push {
        /// JSON payload, e.g. '{"title":"Hi","url":"/inbox"}'
        payload: Option<String>,
    },

    /// Simulate a click on a notification
    Click {
        /// Notification target URL
        url: Option<String>,

        /// Notification tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Deliver a host command as if posted by a client
    Message {
        /// JSON command, e.g. '{"type":"GET_VERSION"}'
        json: String,

        /// Sending client id
        #[arg(long, default_value = "cli")]
        from: String,
    },

    /// List cache buckets
    Buckets {
        /// Also list the keys in each bucket
        #[arg(long)]
        keys: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    let mut host = Host::open(&config, &data_dir, cli.offline, &cli.clients).await?;

    match cli.command {
        Commands::Install => install::run(&mut host).await?,
        Commands::Activate => activate::run(&mut host).await?,
        Commands::Fetch {
            url,
            method,
            headers,
            data,
            navigate,
            include,
        } => {
            let options = fetch::FetchOptions {
                url,
                method,
                headers,
                data,
                navigate,
                include_headers: include,
            };
            fetch::run(&mut host, options).await?;
        }
        Commands::Sync { tag } => sync::run(&mut host, tag.as_deref()).await?,
        Commands::Push { payload } => push::run(&mut host, payload.as_deref()).await?,
        Commands::Click { url, tag } => click::run(&mut host, url, tag).await?,
        Commands::Message { json, from } => message::run(&mut host, &from, &json).await?,
        Commands::Buckets { keys } => buckets::run(&host, keys).await?,
    }

    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` (default: info for offsync crates).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("offsync_cli=info,offsync_engine=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default data directory for offsync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "offsync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
