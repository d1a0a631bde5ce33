// =============================================================================
// Price Feed — Source of new samples for the rolling series
// =============================================================================
//
// The driver only depends on the `PriceFeed` capability. `RandomWalkFeed` is
// the synthetic stand-in for a real market-data adapter: a slightly
// upward-biased random walk whose moving averages and RSI are noise around
// the new price rather than values computed from history.
// =============================================================================

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::indicators::round_to;
use crate::market_data::Sample;
use crate::runtime_config::DashboardConfig;

/// Produces the next sample to append to the series.
///
/// Implementations must return finite prices, an RSI in [0, 100] and a
/// timestamp strictly after `previous`'s.
pub trait PriceFeed: Send {
    /// Produce one sample following `previous` (the current latest sample of
    /// the series, if any).
    fn next_sample(&mut self, previous: Option<&Sample>) -> Sample;

    /// Produce the initial batch the series is seeded with at startup.
    fn warmup(&mut self, count: usize) -> Vec<Sample> {
        let mut batch: Vec<Sample> = Vec::with_capacity(count);
        for _ in 0..count {
            let sample = self.next_sample(batch.last());
            batch.push(sample);
        }
        batch
    }
}

// =============================================================================
// RandomWalkFeed
// =============================================================================

/// Tunables for the synthetic random walk.
#[derive(Debug, Clone)]
pub struct WalkParams {
    /// Starting price when there is no previous sample.
    pub base_price: f64,
    /// Subtracted from a uniform [0, 1) draw; values below 0.5 bias upward.
    pub drift_bias: f64,
    /// Step scale for the backdated warm-up batch.
    pub warmup_step: f64,
    /// Step scale for live ticks.
    pub live_step: f64,
    /// Spacing between backdated warm-up samples.
    pub warmup_spacing: Duration,
}

impl TryFrom<&DashboardConfig> for WalkParams {
    type Error = anyhow::Error;

    /// Fails when the warm-up spacing is zero or does not fit a chrono
    /// duration; backdated samples must be strictly increasing.
    fn try_from(config: &DashboardConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(
            config.warmup_spacing_secs > 0,
            "warmup_spacing_secs must be positive"
        );
        let secs = i64::try_from(config.warmup_spacing_secs)
            .with_context(|| format!("warmup_spacing_secs out of range: {}", config.warmup_spacing_secs))?;
        let warmup_spacing = Duration::try_seconds(secs)
            .with_context(|| format!("warmup_spacing_secs out of range: {secs}"))?;

        Ok(Self {
            base_price: config.base_price,
            drift_bias: config.drift_bias,
            warmup_step: config.warmup_step,
            live_step: config.live_step,
            warmup_spacing,
        })
    }
}

/// Synthetic gold price generator.
pub struct RandomWalkFeed {
    params: WalkParams,
    rng: StdRng,
}

impl RandomWalkFeed {
    /// Feed seeded from the operating system's entropy source.
    pub fn new(params: WalkParams) -> Self {
        Self {
            params,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible feed for fixtures.
    #[cfg(test)]
    pub fn seeded(params: WalkParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn step(&mut self, scale: f64) -> f64 {
        (self.rng.random::<f64>() - self.params.drift_bias) * scale
    }

    /// Attach noisy moving averages, RSI and volume to a price.
    fn decorate(&mut self, timestamp: DateTime<Utc>, price: f64) -> Sample {
        let short_noise = self.rng.random::<f64>() * 2.0 - 1.0;
        let long_noise = self.rng.random::<f64>() * 4.0 - 2.0;
        let rsi = 50.0 + self.rng.random::<f64>() * 30.0 - 10.0;
        let volume = self.rng.random_range(2_000..7_000);

        Sample {
            timestamp,
            price: round_to(price, 2),
            short_ma: round_to(price - short_noise, 2),
            long_ma: round_to(price - long_noise, 2),
            rsi: round_to(rsi, 1),
            volume,
        }
    }
}

impl PriceFeed for RandomWalkFeed {
    fn next_sample(&mut self, previous: Option<&Sample>) -> Sample {
        let last_price = previous.map_or(self.params.base_price, |s| s.price);
        let price = last_price + self.step(self.params.live_step);

        let now = Utc::now();
        let timestamp = match previous {
            Some(prev) if prev.timestamp >= now => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        self.decorate(timestamp, price)
    }

    /// Backdated batch ending one spacing before now, walking from the base
    /// price with the wider warm-up step.
    fn warmup(&mut self, count: usize) -> Vec<Sample> {
        let now = Utc::now();
        let mut price = self.params.base_price;
        let mut batch = Vec::with_capacity(count);

        for i in 0..count {
            price += self.step(self.params.warmup_step);
            let back = (count - i) as i32;
            let timestamp = now - self.params.warmup_spacing * back;
            batch.push(self.decorate(timestamp, price));
        }

        batch
    }
}

// =============================================================================
// Scripted feed for deterministic tests
// =============================================================================

/// Replays a fixed list of samples. Once exhausted it repeats the previous
/// sample one minute later.
#[cfg(test)]
pub(crate) struct ScriptedFeed {
    script: std::collections::VecDeque<Sample>,
}

#[cfg(test)]
impl ScriptedFeed {
    pub(crate) fn new(script: Vec<Sample>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

#[cfg(test)]
impl PriceFeed for ScriptedFeed {
    fn next_sample(&mut self, previous: Option<&Sample>) -> Sample {
        if let Some(next) = self.script.pop_front() {
            return next;
        }
        let mut repeat = previous.cloned().unwrap_or_else(|| {
            crate::market_data::series::tests::sample_at(0, 2050.0, 2050.0, 2050.0, 50.0)
        });
        repeat.timestamp += Duration::minutes(1);
        repeat
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> WalkParams {
        WalkParams::try_from(&DashboardConfig::default()).unwrap()
    }

    #[test]
    fn degenerate_spacing_is_rejected() {
        let zero = DashboardConfig {
            warmup_spacing_secs: 0,
            ..DashboardConfig::default()
        };
        assert!(WalkParams::try_from(&zero).is_err());

        let huge = DashboardConfig {
            warmup_spacing_secs: u64::MAX,
            ..DashboardConfig::default()
        };
        assert!(WalkParams::try_from(&huge).is_err());
    }

    #[test]
    fn one_second_spacing_stays_chronological() {
        let config = DashboardConfig {
            warmup_spacing_secs: 1,
            ..DashboardConfig::default()
        };
        let mut feed = RandomWalkFeed::seeded(WalkParams::try_from(&config).unwrap(), 5);
        let batch = feed.warmup(50);
        assert!(batch.windows(2).all(|p| p[0].timestamp < p[1].timestamp));
    }

    #[test]
    fn warmup_is_backdated_and_chronological() {
        let mut feed = RandomWalkFeed::seeded(params(), 7);
        let batch = feed.warmup(50);

        assert_eq!(batch.len(), 50);
        for pair in batch.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::seconds(300));
        }
        assert!(batch[49].timestamp < Utc::now());
    }

    #[test]
    fn samples_are_well_formed() {
        let mut feed = RandomWalkFeed::seeded(params(), 42);
        let mut batch = feed.warmup(50);
        for _ in 0..200 {
            let next = feed.next_sample(batch.last());
            batch.push(next);
        }

        for s in &batch {
            assert!(s.price.is_finite());
            assert!((40.0..=70.0).contains(&s.rsi), "rsi {} out of range", s.rsi);
            assert!((2_000..7_000).contains(&s.volume));
            // Noise bound plus one cent of rounding slack.
            assert!((s.price - s.short_ma).abs() <= 1.01 + 1e-9);
            assert!((s.price - s.long_ma).abs() <= 2.01 + 1e-9);
        }
    }

    #[test]
    fn live_step_is_bounded() {
        let mut feed = RandomWalkFeed::seeded(params(), 3);
        let mut prev = feed.next_sample(None);
        for _ in 0..500 {
            let next = feed.next_sample(Some(&prev));
            // (u - 0.48) * 2 lies in [-0.96, 1.04); rounding adds at most 0.01.
            assert!((next.price - prev.price).abs() <= 1.05);
            assert!(next.timestamp > prev.timestamp);
            prev = next;
        }
    }

    #[test]
    fn seeded_feeds_are_reproducible() {
        let mut a = RandomWalkFeed::seeded(params(), 11);
        let mut b = RandomWalkFeed::seeded(params(), 11);
        let pa: Vec<f64> = a.warmup(10).iter().map(|s| s.price).collect();
        let pb: Vec<f64> = b.warmup(10).iter().map(|s| s.price).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn scripted_feed_replays_then_repeats() {
        use crate::market_data::series::tests::sample_at;

        let mut feed = ScriptedFeed::new(vec![sample_at(0, 1.0, 1.0, 1.0, 50.0)]);
        let first = feed.next_sample(None);
        assert_eq!(first.price, 1.0);

        let second = feed.next_sample(Some(&first));
        assert_eq!(second.price, 1.0);
        assert_eq!(second.timestamp - first.timestamp, Duration::minutes(1));
    }
}
