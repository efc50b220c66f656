//! Docsift server binary
//!
//! Starts the HTTP server for document upload and analysis.

use anyhow::Context;
use clap::Parser;
use docsift_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Document ingestion and analysis server
#[derive(Debug, Parser)]
#[command(name = "docsift-server", version, about, long_about = None)]
struct Args {
    /// Load configuration from a TOML file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the bind address from the config file
    #[arg(long, value_name = "ADDR:PORT")]
    bind: Option<String>,

    /// API key for the LLM provider
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsift=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            warn!("No config file specified, using defaults");
            ServerConfig::default()
        }
    };

    if let Some(bind) = &args.bind {
        config = config.with_bind(bind)?;
    }

    start_server(config, args.api_key).await?;
    Ok(())
}
