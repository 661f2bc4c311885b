//! overlaycast - RTSP to HLS streaming gateway with overlay management.
//!
//! Starts the HTTP API, which supervises per-stream ffmpeg transcoder
//! processes and stores overlay annotations. Runs until SIGINT/SIGTERM,
//! then tears down every tracked transcoder before exiting.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use overlaycast::config::Config;
use overlaycast::server;

#[derive(Parser)]
#[command(name = "overlaycast")]
#[command(version)]
#[command(about = "RTSP to HLS streaming gateway with overlay management")]
struct Cli {
    /// Port for the HTTP API (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to the configuration file (default: ./overlaycast.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize the global tracing subscriber. Respects `RUST_LOG` if set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    server::serve(config).await
}
