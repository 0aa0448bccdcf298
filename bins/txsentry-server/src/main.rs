//! txsentry-server: HTTP fraud-verdict service.
//!
//! Loads the model and scaler artifacts once at startup, then serves a
//! liveness check at `/` and single-transaction predictions at `/predict`.
//! A failed artifact load stops the process before it binds.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use txsentry_core::InferenceService;

mod config;
mod routes;

use config::Config;

/// Shared application state passed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    /// Loaded artifacts behind the prediction pipeline; read-only.
    pub service: InferenceService,
}

/// txsentry prediction server.
#[derive(Parser, Debug)]
#[command(name = "txsentry-server", version, about = "Fraud verdicts for blockchain transactions over HTTP")]
struct Args {
    /// HTTP bind address (overrides TXSENTRY_BIND_ADDR)
    #[arg(long)]
    bind_addr: Option<String>,

    /// Path to the model artifact (overrides TXSENTRY_MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Path to the scaler artifact (overrides TXSENTRY_SCALER_PATH)
    #[arg(long)]
    scaler: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format ("text" or "json")
    #[arg(long)]
    log_format: Option<String>,
}

impl Args {
    /// Layer command-line flags over the environment configuration.
    fn apply(self, mut config: Config) -> Config {
        if let Some(addr) = self.bind_addr {
            config.bind_addr = addr;
        }
        if let Some(path) = self.model {
            config.artifacts.model = path;
        }
        if let Some(path) = self.scaler {
            config.artifacts.scaler = path;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().apply(Config::from_env());

    init_logging(&config.log_level, &config.log_format);

    info!(
        bind = %config.bind_addr,
        model = %config.artifacts.model.display(),
        scaler = %config.artifacts.scaler.display(),
        "Starting txsentry-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let service = match InferenceService::load(&config.artifacts) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to load artifacts: {}", e);
            process::exit(1);
        }
    };
    info!("Model and scaler loaded");

    let app = routes::router(AppState { service });

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("txsentry-server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down...");
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
