// =============================================================================
// Krypto Dash: Main Entry Point
// =============================================================================
//
// Serves the XRP / HBAR market dashboard over HTTP. Every request runs one
// full render pass against a snapshot of the configuration; there are no
// background jobs.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod dashboard;
mod error;
mod indicators;
mod market_data;
mod news;
mod runtime_config;
mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::market_data::YahooClient;
use crate::news::HttpFeedFetcher;
use crate::runtime_config::DashboardConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Krypto Dash starting up");

    let config_path =
        std::env::var("DASH_CONFIG").unwrap_or_else(|_| "dashboard_config.json".into());

    let config = DashboardConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });

    info!(
        symbols = ?config.symbols.iter().map(|s| s.symbol.as_str()).collect::<Vec<_>>(),
        lookback_days = config.default_lookback_days,
        feeds = config.news.feeds.len(),
        "Configured dashboard"
    );

    // ── 2. Outbound clients ──────────────────────────────────────────────
    let provider = Arc::new(YahooClient::new(&config.provider)?);
    let feeds = Arc::new(HttpFeedFetcher::new(Duration::from_secs(
        config.provider.timeout_secs,
    ))?);

    // ── 3. Shared state ──────────────────────────────────────────────────
    let state = Arc::new(AppState::new(config, config_path, provider, feeds));

    // ── 4. API server ────────────────────────────────────────────────────
    let bind_addr = std::env::var("DASH_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening. Press Ctrl+C to stop.");

    axum::serve(listener, api::rest::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("Krypto Dash shut down complete.");
    Ok(())
}

// ── Graceful shutdown ────────────────────────────────────────────────────────
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, stopping gracefully");
}
