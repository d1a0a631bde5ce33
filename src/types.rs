// =============================================================================
// Shared types used across the goldview dashboard engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Direction of the market derived from price vs. the two moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "BULLISH"),
            Self::Bearish => write!(f, "BEARISH"),
            Self::Sideways => write!(f, "SIDEWAYS"),
        }
    }
}

/// Trading recommendation emitted by the indicator engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Categorical trend/momentum agreement annotation. Not the MACD oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdLabel {
    #[serde(rename = "Bullish Cross")]
    BullishCross,
    #[serde(rename = "Bearish Cross")]
    BearishCross,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl std::fmt::Display for MacdLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BullishCross => write!(f, "Bullish Cross"),
            Self::BearishCross => write!(f, "Bearish Cross"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Where the current RSI sits relative to the classic 30/70 thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Oversold,
    Normal,
    Overbought,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi < 30.0 {
            Self::Oversold
        } else if rsi > 70.0 {
            Self::Overbought
        } else {
            Self::Normal
        }
    }
}
