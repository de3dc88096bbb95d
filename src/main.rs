//! Application entry point and server initialization
//!
//! Loads configuration, opens the database, starts the expiry sweeper and
//! serves HTTP until SIGINT/SIGTERM.

use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use shortlink::config::AppConfig;
use shortlink::database::RedbRepository;
use shortlink::route::{create_app, AppState};
use shortlink::service::UrlService;
use shortlink::sweeper::{SweepSchedule, Sweeper};

/// # Environment Variables
///
/// - `API_KEYS` - Comma-separated allow-list of API keys (required)
/// - `HOST` / `PORT` - Bind address (default: localhost:3000)
/// - `PUBLIC_URL` - Prefix for generated short links (default: http://localhost:3000)
/// - `DATABASE_URL` - Path to database file (default: "data.db")
/// - `SWEEP_INTERVAL_SECS` - Fixed sweep period instead of daily at local midnight
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shortlink=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    let repository = RedbRepository::open(&config.database_url)
        .with_context(|| format!("failed to open database at {}", config.database_url))?;
    tracing::info!(database = %config.database_url, "database ready");

    let service = UrlService::new(
        Arc::new(repository),
        config.api_keys.clone(),
        &config.public_url,
    );

    let schedule = match config.sweep_interval {
        Some(period) => SweepSchedule::Every(period),
        None => SweepSchedule::DailyAtLocalMidnight,
    };
    let sweeper = Sweeper::new(service.clone(), schedule).spawn();

    let app = create_app(AppState { service }).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        public_url = %config.public_url,
        api_keys = config.api_keys.len(),
        "server running"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.stop().await;
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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

    tracing::info!("shutdown signal received, stopping server");
}
