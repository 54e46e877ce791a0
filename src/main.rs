#![forbid(unsafe_code)]

//! `labelflow` — annotation workflow engine binary.
//!
//! Bootstraps configuration, the `SQLite` store, the retraining
//! notification listener, and the HTTP API.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use labelflow::api::routes;
use labelflow::api::state::AppState;
use labelflow::config::GlobalConfig;
use labelflow::notify::{spawn_logging_listener, RetrainTrigger};
use labelflow::persistence::db;
use labelflow::workflow::coordinator::WorkflowCoordinator;
use labelflow::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "labelflow", about = "Annotation workflow engine", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("labelflow server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let config = match args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::from_toml_str("")?,
    };
    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Initialize database ─────────────────────────────
    let database = Arc::new(db::connect(&config.db_path).await?);
    info!(db_path = %config.db_path.display(), "database connected");

    // ── Start retraining listener ───────────────────────
    let ct = CancellationToken::new();
    let (retrain, retrain_rx) = RetrainTrigger::channel();
    let retrain_handle = spawn_logging_listener(retrain_rx, ct.clone());
    info!("retraining listener started");

    // ── Build shared application state ──────────────────
    let coordinator = WorkflowCoordinator::new(Arc::clone(&database), retrain);
    let state = AppState {
        config: Arc::clone(&config),
        db: database,
        coordinator,
    };

    // ── Serve HTTP ──────────────────────────────────────
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Io(format!("failed to bind {addr}: {err}")))?;
    info!(%addr, "labelflow API ready");

    axum::serve(listener, routes::router().with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Io(format!("server error: {err}")))?;

    info!("shutdown signal received");
    ct.cancel();
    let _ = retrain_handle.await;
    info!("labelflow shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
