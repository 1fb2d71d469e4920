//! Sunfund server binary
//!
//! Extracts solar financing updates from news articles over HTTP.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sunfund_server::{config::ServiceConfig, init_tracing, start_server};
use tracing::warn;

/// Sunfund - solar financing update extraction service
#[derive(Debug, Parser)]
#[command(name = "sunfund-server", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "SUNFUND_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address (addr:port)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = match &cli.config {
        Some(path) if path.exists() => ServiceConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        Some(path) => {
            warn!("Config file {} not found, using defaults", path.display());
            ServiceConfig::default()
        }
        None => {
            warn!("No config file specified, using defaults");
            ServiceConfig::default()
        }
    };

    if let Some(bind) = &cli.bind {
        let (address, port) = bind
            .rsplit_once(':')
            .context("--bind must be addr:port")?;
        config.server.bind_address = address.to_string();
        config.server.bind_port = port.parse().context("--bind port must be a number")?;
    }

    start_server(config).await?;
    Ok(())
}
