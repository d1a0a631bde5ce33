// =============================================================================
// Central Application State — goldview dashboard
// =============================================================================
//
// Ties the session to the read-only API surface. The update driver is the
// only writer; HTTP handlers and WebSocket connections take snapshots.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking.
//   - parking_lot::RwLock around the session; the write lock is held only
//     for the synchronous append + recompute.
// =============================================================================

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::indicators::{Analysis, QuoteSummary, Recommendation};
use crate::market_data::{PriceSeries, Sample};
use crate::runtime_config::DashboardConfig;
use crate::session::Session;
use crate::types::RsiZone;

// =============================================================================
// Chart point
// =============================================================================

/// One x-axis position on the price, moving-average and RSI charts.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPoint {
    /// Wall-clock `HH:MM` label.
    pub time: String,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    pub rsi: f64,
    pub volume: u64,
}

impl From<&Sample> for ChartPoint {
    fn from(s: &Sample) -> Self {
        Self {
            time: s.time_label(),
            timestamp: s.timestamp,
            price: s.price,
            short_ma: s.short_ma,
            long_ma: s.long_ma,
            rsi: s.rsi,
            volume: s.volume,
        }
    }
}

pub fn chart_points(series: &PriceSeries) -> Vec<ChartPoint> {
    series.iter().map(ChartPoint::from).collect()
}

// =============================================================================
// AppState
// =============================================================================

/// Central application state shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Monotonically increasing version counter. Incremented on every
    /// session update. The WebSocket feed uses this to detect changes.
    pub state_version: AtomicU64,

    /// Total WebSocket messages sent across all connections.
    pub ws_sequence_number: AtomicU64,

    /// Number of currently open WebSocket connections.
    pub ws_clients: AtomicUsize,

    // ── Configuration ───────────────────────────────────────────────────
    pub config: DashboardConfig,

    // ── Session ─────────────────────────────────────────────────────────
    pub session: RwLock<Session>,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the engine was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct the state around a session seeded with `initial` samples.
    pub fn new(config: DashboardConfig, initial: Vec<Sample>) -> Self {
        let session = Session::new(config.series_capacity, config.level_window, initial);

        Self {
            state_version: AtomicU64::new(1),
            ws_sequence_number: AtomicU64::new(0),
            ws_clients: AtomicUsize::new(0),
            config,
            session: RwLock::new(session),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version. Returns the previous value.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    /// Read the current state version without modifying it.
    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Mutation ────────────────────────────────────────────────────────

    /// Append one sample to the session and publish the new version.
    pub fn apply_sample(&self, sample: Sample) -> Analysis {
        let mut session = self.session.write();
        let analysis = session.update(sample);
        self.increment_version();
        analysis
    }

    // ── Read-outs ───────────────────────────────────────────────────────

    pub fn analysis(&self) -> Analysis {
        self.session.read().analysis().clone()
    }

    pub fn chart_points(&self) -> Vec<ChartPoint> {
        chart_points(self.session.read().series())
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    /// Build a complete, serialisable snapshot of the dashboard.
    ///
    /// This is the payload of `GET /api/v1/state` and the WebSocket push
    /// feed. The version is read under the session lock so that it matches
    /// the series and analysis it is sent with.
    pub fn build_snapshot(&self) -> DashboardSnapshot {
        let session = self.session.read();
        let version = self.current_state_version();
        let analysis = session.analysis().clone();

        DashboardSnapshot {
            state_version: version,
            session_id: session.id(),
            symbol: self.config.symbol.clone(),
            server_time: Utc::now().timestamp_millis(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            updates: session.updates(),
            series_capacity: session.series().capacity(),
            quote: QuoteSummary::from_series(session.series()),
            rsi_zone: RsiZone::classify(analysis.rsi),
            recommendation: Recommendation::from_analysis(&analysis),
            analysis,
            series: chart_points(session.series()),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the presentation layer needs to render one frame.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub state_version: u64,
    pub session_id: Uuid,
    pub symbol: String,
    pub server_time: i64,
    pub uptime_secs: u64,
    /// Live ticks applied since startup.
    pub updates: u64,
    pub series_capacity: usize,
    pub quote: QuoteSummary,
    pub analysis: Analysis,
    pub rsi_zone: RsiZone,
    pub recommendation: Recommendation,
    pub series: Vec<ChartPoint>,
}
