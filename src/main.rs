// =============================================================================
// goldview — Main Entry Point
// =============================================================================
//
// Simulated XAU/USD technical-analysis dashboard backend. A synthetic feed
// seeds a rolling price window, an update driver appends one sample per tick
// and recomputes the analysis, and a read-only HTTP/WebSocket API serves the
// result to the dashboard page.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod driver;
mod indicators;
mod market_data;
mod runtime_config;
mod session;
mod ticker;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::driver::UpdateDriver;
use crate::market_data::{PriceFeed, RandomWalkFeed, WalkParams};
use crate::runtime_config::DashboardConfig;

const CONFIG_PATH: &str = "goldview_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        goldview — XAU/USD Analysis Dashboard            ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut config = DashboardConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });
    config.apply_env_overrides()?;

    info!(
        symbol = %config.symbol,
        capacity = config.series_capacity,
        level_window = config.level_window,
        tick_ms = config.tick_interval_ms,
        "Dashboard configured"
    );

    // ── 2. Seed the session from the synthetic feed ──────────────────────
    let mut feed = RandomWalkFeed::new(WalkParams::try_from(&config)?);
    let initial = feed.warmup(config.series_capacity);
    let state = Arc::new(AppState::new(config.clone(), initial));

    {
        let session = state.session.read();
        let analysis = session.analysis();
        info!(
            session_id = %session.id(),
            samples = session.series().len(),
            trend = %analysis.trend,
            signal = %analysis.signal,
            support = analysis.support,
            resistance = analysis.resistance,
            "Session seeded"
        );
        if session.series().is_empty() {
            warn!("Session seeded with no samples; analysis stays neutral until two ticks arrive");
        }
    }

    // ── 3. Update driver ─────────────────────────────────────────────────
    let ticker = UpdateDriver::new(state.clone(), Box::new(feed)).start(
        tokio::time::Duration::from_millis(config.tick_interval_ms),
    );

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "API server listening");

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "API server stopped");
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    ticker.cancel().await;
    server.abort();

    info!(
        updates = state.session.read().updates(),
        "goldview shut down complete."
    );
    Ok(())
}
