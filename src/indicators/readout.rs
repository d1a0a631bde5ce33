// =============================================================================
// Dashboard Read-outs — Quote header and recommendation text
// =============================================================================

use serde::Serialize;

use crate::indicators::{round_to, Analysis};
use crate::market_data::PriceSeries;
use crate::types::{RsiZone, Signal};

const DISCLAIMER: &str = "This analysis is for educational purposes only. Forex trading carries \
     a high level of risk. Always apply sound risk management and never trade with money you \
     cannot afford to lose.";

/// Header figures: latest price and its change vs. the previous sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSummary {
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
}

impl QuoteSummary {
    /// Change figures are zero until the series holds two samples.
    pub fn from_series(series: &PriceSeries) -> Self {
        let price = series.latest().map_or(0.0, |s| s.price);
        let (change, change_pct) = match series.previous() {
            Some(prev) if prev.price != 0.0 => {
                let change = price - prev.price;
                (change, change / prev.price * 100.0)
            }
            _ => (0.0, 0.0),
        };

        Self {
            price: round_to(price, 2),
            change: round_to(change, 2),
            change_pct: round_to(change_pct, 2),
        }
    }
}

/// Human-readable guidance rendered under the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub technical: String,
    pub levels: String,
    pub rsi: String,
    pub disclaimer: &'static str,
}

impl Recommendation {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let signal_note = match analysis.signal {
            Signal::Buy => {
                "BUY signal detected: consider a long entry with a stop loss below support."
            }
            Signal::Sell => {
                "SELL signal detected: consider a short entry with a stop loss above resistance."
            }
            Signal::Hold => "HOLD: wait for further confirmation before entering.",
        };
        let technical = format!(
            "The current trend is {} with {:.1}% strength. {}",
            analysis.trend, analysis.strength, signal_note
        );

        let levels = format!(
            "Strong support at ${:.2} and resistance at ${:.2}. Use these levels to place \
             stop loss and take profit.",
            analysis.support, analysis.resistance
        );

        let zone_note = match RsiZone::classify(analysis.rsi) {
            RsiZone::Oversold => "Oversold: a bullish reversal is possible.",
            RsiZone::Overbought => "Overbought: a bearish reversal is possible.",
            RsiZone::Normal => "RSI is in the normal range: follow the prevailing trend.",
        };
        let rsi = format!("RSI is currently at {:.1}. {}", analysis.rsi, zone_note);

        Self {
            technical,
            levels,
            rsi,
            disclaimer: DISCLAIMER,
        }
    }
}
