// =============================================================================
// Runtime Configuration — Dashboard settings loaded at startup
// =============================================================================
//
// Every tunable of the dashboard lives here: the simulated instrument, the
// window sizes the indicators work over, and the refresh cadence.
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file. Environment variables override the file.
//
// =============================================================================

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbol() -> String {
    "XAU/USD".to_string()
}

fn default_base_price() -> f64 {
    2050.0
}

fn default_series_capacity() -> usize {
    50
}

fn default_level_window() -> usize {
    crate::indicators::analysis::DEFAULT_LEVEL_WINDOW
}

fn default_tick_interval_ms() -> u64 {
    3_000
}

fn default_warmup_spacing_secs() -> u64 {
    300
}

/// Upper bound for the warm-up spacing: one day between backdated samples.
pub const MAX_WARMUP_SPACING_SECS: u64 = 86_400;

fn default_drift_bias() -> f64 {
    0.48
}

fn default_warmup_step() -> f64 {
    5.0
}

fn default_live_step() -> f64 {
    2.0
}

fn default_ws_push_interval_ms() -> u64 {
    500
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// DashboardConfig
// =============================================================================

/// Top-level configuration for the dashboard engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    // --- Instrument ---------------------------------------------------------

    /// Display symbol of the simulated instrument.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Price the synthetic walk starts from.
    #[serde(default = "default_base_price")]
    pub base_price: f64,

    // --- Windows ------------------------------------------------------------

    /// Maximum number of samples kept in the rolling series (N).
    #[serde(default = "default_series_capacity")]
    pub series_capacity: usize,

    /// Number of most recent samples support/resistance are taken over.
    #[serde(default = "default_level_window")]
    pub level_window: usize,

    // --- Cadence ------------------------------------------------------------

    /// Period of the update driver in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// How often each WebSocket connection checks for a newer state version.
    #[serde(default = "default_ws_push_interval_ms")]
    pub ws_push_interval_ms: u64,

    // --- Synthetic feed -----------------------------------------------------

    /// Spacing between backdated warm-up samples, in seconds.
    #[serde(default = "default_warmup_spacing_secs")]
    pub warmup_spacing_secs: u64,

    /// Subtracted from a uniform [0, 1) draw; below 0.5 gives an upward bias.
    #[serde(default = "default_drift_bias")]
    pub drift_bias: f64,

    /// Step scale of the warm-up walk.
    #[serde(default = "default_warmup_step")]
    pub warmup_step: f64,

    /// Step scale of live ticks.
    #[serde(default = "default_live_step")]
    pub live_step: f64,

    // --- Server -------------------------------------------------------------

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            base_price: default_base_price(),
            series_capacity: default_series_capacity(),
            level_window: default_level_window(),
            tick_interval_ms: default_tick_interval_ms(),
            ws_push_interval_ms: default_ws_push_interval_ms(),
            warmup_spacing_secs: default_warmup_spacing_secs(),
            drift_bias: default_drift_bias(),
            warmup_step: default_warmup_step(),
            live_step: default_live_step(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path` and validate it.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid dashboard config in {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = %config.symbol,
            capacity = config.series_capacity,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Apply `GOLDVIEW_*` environment overrides on top of the loaded values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(addr) = std::env::var("GOLDVIEW_BIND_ADDR") {
            if !addr.trim().is_empty() {
                self.bind_addr = addr.trim().to_string();
            }
        }
        if let Ok(raw) = std::env::var("GOLDVIEW_TICK_MS") {
            self.tick_interval_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("GOLDVIEW_TICK_MS is not a valid integer: {raw}"))?;
        }
        self.validate()
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.series_capacity >= 2,
            "series_capacity must be at least 2 (got {})",
            self.series_capacity
        );
        ensure!(self.level_window >= 1, "level_window must be at least 1");
        ensure!(self.tick_interval_ms > 0, "tick_interval_ms must be positive");
        ensure!(self.ws_push_interval_ms > 0, "ws_push_interval_ms must be positive");
        ensure!(
            (1..=MAX_WARMUP_SPACING_SECS).contains(&self.warmup_spacing_secs),
            "warmup_spacing_secs must be within 1..={} (got {})",
            MAX_WARMUP_SPACING_SECS,
            self.warmup_spacing_secs
        );
        ensure!(
            self.base_price.is_finite() && self.base_price > 0.0,
            "base_price must be a positive finite number"
        );
        Ok(())
    }
}
