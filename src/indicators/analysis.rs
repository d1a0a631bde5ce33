// =============================================================================
// Analysis — Trend, signal and key levels from the rolling series
// =============================================================================
//
// Given the latest sample L and the one before it P:
//
//   delta      = L.price - P.price
//   trend      = BULLISH   if L.price > L.short_ma > L.long_ma
//                BEARISH   if L.price < L.short_ma < L.long_ma
//                SIDEWAYS  otherwise
//   signal     = first match of
//                  BUY  rsi < 30 and delta > 0
//                  SELL rsi > 70 and delta < 0
//                  BUY  BULLISH and 40 < rsi < 60
//                  SELL BEARISH and 50 < rsi < 70
//                  HOLD
//   strength   = min(100, |L.price - L.long_ma| / L.long_ma * 1000 + rsi * 0.5)
//   support    = min price over the level window
//   resistance = max price over the level window
//   macd label = Bullish Cross if BULLISH and delta > 0
//                Bearish Cross if BEARISH and delta < 0
//                Neutral otherwise
//
// Prices are rounded to 2 decimals, RSI and strength to 1.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::round_to;
use crate::market_data::{PriceSeries, Sample};
use crate::types::{MacdLabel, Signal, Trend};

/// Number of most recent samples support/resistance are taken over.
pub const DEFAULT_LEVEL_WINDOW: usize = 20;

/// Snapshot of the indicator read-outs for the current series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub trend: Trend,
    pub signal: Signal,
    /// Blend of distance from the long MA and RSI, clamped to [0, 100].
    pub strength: f64,
    pub support: f64,
    pub resistance: f64,
    pub rsi: f64,
    pub macd_label: MacdLabel,
}

impl Default for Analysis {
    /// Neutral placeholder held until the series has two samples.
    fn default() -> Self {
        Self {
            trend: Trend::Sideways,
            signal: Signal::Hold,
            strength: 0.0,
            support: 0.0,
            resistance: 0.0,
            rsi: 50.0,
            macd_label: MacdLabel::Neutral,
        }
    }
}

/// Compute a fresh [`Analysis`] from `series`.
///
/// Returns a clone of `previous` when the series holds fewer than two
/// samples. `level_window` bounds the support/resistance look-back; a window
/// of zero is treated as one.
///
/// Precondition: the latest sample's `long_ma` is non-zero.
pub fn compute_analysis(series: &PriceSeries, level_window: usize, previous: &Analysis) -> Analysis {
    let (latest, prior) = match (series.latest(), series.previous()) {
        (Some(latest), Some(prior)) => (latest, prior),
        _ => return previous.clone(),
    };

    let delta = latest.price - prior.price;
    let rsi = latest.rsi;
    let trend = classify_trend(latest);
    let signal = derive_signal(trend, rsi, delta);
    let strength = trend_strength(latest);
    let (support, resistance) = price_levels(series, level_window.max(1));

    Analysis {
        trend,
        signal,
        strength: round_to(strength, 1),
        support: round_to(support, 2),
        resistance: round_to(resistance, 2),
        rsi: round_to(rsi, 1),
        macd_label: macd_label(trend, delta),
    }
}

/// Price stacked strictly above/below both averages in order.
pub fn classify_trend(sample: &Sample) -> Trend {
    if sample.price > sample.short_ma && sample.short_ma > sample.long_ma {
        Trend::Bullish
    } else if sample.price < sample.short_ma && sample.short_ma < sample.long_ma {
        Trend::Bearish
    } else {
        Trend::Sideways
    }
}

/// Reversal rules are checked before trend-following ones.
pub fn derive_signal(trend: Trend, rsi: f64, delta: f64) -> Signal {
    if rsi < 30.0 && delta > 0.0 {
        Signal::Buy
    } else if rsi > 70.0 && delta < 0.0 {
        Signal::Sell
    } else if trend == Trend::Bullish && rsi > 40.0 && rsi < 60.0 {
        Signal::Buy
    } else if trend == Trend::Bearish && rsi > 50.0 && rsi < 70.0 {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

fn trend_strength(sample: &Sample) -> f64 {
    let deviation = (sample.price - sample.long_ma).abs() / sample.long_ma * 1000.0;
    (deviation + sample.rsi * 0.5).min(100.0)
}

/// (min, max) price over the most recent `window` samples.
fn price_levels(series: &PriceSeries, window: usize) -> (f64, f64) {
    series
        .last_n(window)
        .map(|s| s.price)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p), hi.max(p))
        })
}

fn macd_label(trend: Trend, delta: f64) -> MacdLabel {
    match trend {
        Trend::Bullish if delta > 0.0 => MacdLabel::BullishCross,
        Trend::Bearish if delta < 0.0 => MacdLabel::BearishCross,
        _ => MacdLabel::Neutral,
    }
}
