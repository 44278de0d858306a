//! mapsd - Maps Gateway Daemon
//!
//! Forwards geocoding, reverse geocoding, directions and place requests to
//! the mapping provider, injecting the server-held API key.
//!
//! Usage:
//!   mapsd [OPTIONS]
//!
//! The API key is read from `GOOGLE_MAPS_API_KEY`, falling back to
//! `[upstream].api_key` in the config file.

mod config;

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use maps_api::{create_router_with_prefix, AppState};
use maps_gateway::Dispatcher;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{DaemonConfig, API_KEY_ENV};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "mapsd")]
#[command(author, version, about = "Maps gateway daemon")]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "MAPSD_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (overrides [server].host)
    #[arg(long, env = "MAPSD_HOST")]
    host: Option<IpAddr>,

    /// Listen port (overrides [server].port)
    #[arg(short, long, env = "MAPSD_PORT")]
    port: Option<u16>,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "mapsd=info,maps_api=info,maps_gateway=info,tower_http=info".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    tracing::info!("Starting mapsd (Maps Gateway Daemon)");

    let mut config = if let Some(ref path) = cli.config {
        tracing::info!("Loading config from: {}", path.display());
        DaemonConfig::load_from(path)?
    } else {
        tracing::info!("No config file provided, using defaults");
        DaemonConfig::default()
    };
    config.apply_overrides(cli.host, cli.port);

    let env_key = std::env::var(API_KEY_ENV).ok();
    let api_key = config.upstream.api_key(env_key.as_deref())?;

    let dispatcher = Dispatcher::from_config(&config.upstream, api_key)
        .context("Failed to initialize upstream dispatcher")?;

    tracing::info!(
        upstream = %dispatcher.base_url(),
        timeout_secs = config.upstream.timeout_secs,
        "Upstream configured"
    );

    let app = create_router_with_prefix(AppState::new(dispatcher), &config.server.route_prefix);

    let addr = config.server.addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
