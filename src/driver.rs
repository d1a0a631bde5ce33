// =============================================================================
// Update Driver — One tick of the dashboard
// =============================================================================
//
// Each tick pulls one sample from the price feed, appends it to the session
// (which recomputes the analysis) and bumps the state version so that the
// WebSocket feed pushes a fresh snapshot. The driver is the only writer of
// the session.
// =============================================================================

use std::sync::Arc;

use tokio::time::Duration;
use tracing::{debug, info};

use crate::app_state::AppState;
use crate::indicators::Analysis;
use crate::market_data::PriceFeed;
use crate::ticker::Ticker;

pub struct UpdateDriver {
    state: Arc<AppState>,
    feed: Box<dyn PriceFeed>,
}

impl UpdateDriver {
    pub fn new(state: Arc<AppState>, feed: Box<dyn PriceFeed>) -> Self {
        Self { state, feed }
    }

    /// Generate, append and recompute. Returns the new analysis.
    pub fn tick(&mut self) -> Analysis {
        let (sample, prior_signal) = {
            let session = self.state.session.read();
            let sample = self.feed.next_sample(session.series().latest());
            (sample, session.analysis().signal)
        };
        let price = sample.price;

        let analysis = self.state.apply_sample(sample);

        debug!(
            price,
            trend = %analysis.trend,
            signal = %analysis.signal,
            strength = analysis.strength,
            "tick applied"
        );
        if analysis.signal != prior_signal {
            info!(
                from = %prior_signal,
                to = %analysis.signal,
                price,
                rsi = analysis.rsi,
                macd = %analysis.macd_label,
                "signal changed"
            );
        }

        analysis
    }

    /// Run `tick` every `period` until the returned ticker is cancelled.
    pub fn start(mut self, period: Duration) -> Ticker {
        Ticker::spawn("update-driver", period, move || {
            self.tick();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::feed::ScriptedFeed;
    use crate::market_data::series::tests::sample_at;
    use crate::runtime_config::DashboardConfig;
    use crate::types::{MacdLabel, Signal, Trend};

    fn seeded_state(capacity: usize) -> Arc<AppState> {
        let config = DashboardConfig {
            series_capacity: capacity,
            ..DashboardConfig::default()
        };
        let initial = (0..capacity as i64)
            .map(|i| sample_at(i, 2050.0, 2050.0, 2050.0, 50.0))
            .collect();
        Arc::new(AppState::new(config, initial))
    }

    #[test]
    fn tick_appends_evicts_and_publishes() {
        let state = seeded_state(50);
        let feed = ScriptedFeed::new(vec![sample_at(100, 2047.0, 2048.0, 2049.0, 75.0)]);
        let mut driver = UpdateDriver::new(state.clone(), Box::new(feed));

        let analysis = driver.tick();

        assert_eq!(analysis.trend, Trend::Bearish);
        assert_eq!(analysis.signal, Signal::Sell);
        assert_eq!(analysis.macd_label, MacdLabel::BearishCross);

        let session = state.session.read();
        assert_eq!(session.series().len(), 50);
        assert_eq!(session.series().latest().map(|s| s.price), Some(2047.0));
        drop(session);
        assert_eq!(state.current_state_version(), 2);
    }

    #[test]
    fn repeated_ticks_stay_within_capacity() {
        let state = seeded_state(5);
        let mut driver = UpdateDriver::new(state.clone(), Box::new(ScriptedFeed::new(Vec::new())));

        for _ in 0..12 {
            driver.tick();
        }

        assert_eq!(state.session.read().series().len(), 5);
        assert_eq!(state.session.read().updates(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn started_driver_ticks_until_cancelled() {
        let state = seeded_state(50);
        let driver = UpdateDriver::new(state.clone(), Box::new(ScriptedFeed::new(Vec::new())));

        let ticker = driver.start(Duration::from_secs(3));
        tokio::time::sleep(Duration::from_millis(9_500)).await;
        ticker.cancel().await;

        assert_eq!(state.session.read().updates(), 3);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(state.session.read().updates(), 3);
    }
}
