//! hookrelay: receives provider webhooks and forwards them as normalised
//! change notifications.
//!
//! This binary is the composition root. It parses flags, loads the YAML
//! configuration and key files, wires tracing, builds the endpoint registry
//! and serves the listener's router until interrupted. Configuration errors
//! are fatal here; nothing after startup is.

mod config;
mod telemetry;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use listener::{Dispatcher, EndpointRegistry};
use notifier::HttpNotifier;
use sources::GoogleTokenInfo;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;

/// Webhook gateway for git and container registry notifications.
#[derive(Debug, Parser)]
#[command(name = "hookrelay", version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, env = "HOOKRELAY_CONFIG", default_value = "hookrelay.yaml")]
    config: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "HOOKRELAY_LISTEN", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let telemetry = telemetry::init().context("cannot initialise logging")?;

    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %format_args!("{e:#}"), "hookrelay stopped");
    }
    telemetry.shutdown();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_file(&cli.config)
        .with_context(|| format!("cannot load configuration from {}", cli.config.display()))?;
    let base_dir = cli.config.parent().unwrap_or(Path::new("."));
    let endpoints = config.load_endpoints(base_dir)?;

    let client = reqwest::Client::builder()
        .build()
        .context("cannot build HTTP client")?;
    let notifier = HttpNotifier::new(client.clone(), config.api_base())?;
    info!(api = %notifier.notify_url(), "Forwarding changes downstream");

    let registry = EndpointRegistry::build(endpoints, Arc::new(GoogleTokenInfo::new(client)));
    info!(endpoints = registry.len(), "Endpoint registry built");
    let app = Dispatcher::new(registry, Arc::new(notifier)).router();

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("cannot listen on {}", cli.listen))?;
    info!(addr = %cli.listen, "hookrelay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
