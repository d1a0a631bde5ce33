use std::collections::VecDeque;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single timestamped price observation together with the indicator values
/// the feed attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Short moving average (SMA 20 on the chart).
    pub short_ma: f64,
    /// Long moving average (SMA 50 on the chart).
    pub long_ma: f64,
    /// Relative Strength Index in [0, 100].
    pub rsi: f64,
    pub volume: u64,
}

impl Sample {
    /// Wall-clock `HH:MM` label used as the chart x-axis.
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- bounded FIFO window
// ---------------------------------------------------------------------------

/// Fixed-capacity rolling window of samples, oldest first.
///
/// Appending at capacity evicts exactly one sample from the front. Samples
/// are never updated in place. Producers must append in strictly increasing
/// timestamp order.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl PriceSeries {
    /// Create an empty window that retains at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Build a window from an initial batch. Only the newest `capacity`
    /// samples are kept when the batch is larger.
    pub fn from_samples(capacity: usize, initial: impl IntoIterator<Item = Sample>) -> Self {
        let mut series = Self::new(capacity);
        for sample in initial {
            series.append(sample);
        }
        series
    }

    /// Append one sample, evicting the oldest when the window is full.
    pub fn append(&mut self, sample: Sample) {
        debug_assert!(
            self.samples
                .back()
                .map_or(true, |last| last.timestamp < sample.timestamp),
            "samples must be appended in chronological order"
        );

        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// The sample immediately before the latest one.
    pub fn previous(&self) -> Option<&Sample> {
        self.samples.len().checked_sub(2).and_then(|i| self.samples.get(i))
    }

    /// Iterate over the most recent `count` samples (oldest-first order).
    pub fn last_n(&self, count: usize) -> impl Iterator<Item = &Sample> {
        let start = self.samples.len().saturating_sub(count);
        self.samples.range(start..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Fixture sample at `minute` minutes past a fixed epoch.
    pub(crate) fn sample_at(minute: i64, price: f64, short_ma: f64, long_ma: f64, rsi: f64) -> Sample {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap();
        Sample {
            timestamp: base + Duration::minutes(minute),
            price,
            short_ma,
            long_ma,
            rsi,
            volume: 3_000,
        }
    }

    fn flat(minute: i64, price: f64) -> Sample {
        sample_at(minute, price, price, price, 50.0)
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut series = PriceSeries::new(3);
        for i in 0..5 {
            series.append(flat(i, 100.0 + i as f64));
            assert!(series.len() <= 3);
        }

        let prices: Vec<f64> = series.iter().map(|s| s.price).collect();
        assert_eq!(prices, vec![102.0, 103.0, 104.0]);
    }

    #[test]
    fn first_sample_evicted_after_capacity_plus_one_appends() {
        let mut series = PriceSeries::new(50);
        let first = flat(0, 2050.0);
        series.append(first.clone());
        for i in 1..=50 {
            series.append(flat(i, 2050.0 + i as f64));
        }

        assert_eq!(series.len(), 50);
        assert!(series.iter().all(|s| s != &first));
        assert_eq!(series.iter().next().map(|s| s.price), Some(2051.0));
    }

    #[test]
    fn latest_and_previous() {
        let mut series = PriceSeries::new(10);
        assert!(series.is_empty());
        assert!(series.latest().is_none());
        assert!(series.previous().is_none());

        series.append(flat(0, 1.0));
        assert!(!series.is_empty());
        assert_eq!(series.latest().map(|s| s.price), Some(1.0));
        assert!(series.previous().is_none());

        series.append(flat(1, 2.0));
        assert_eq!(series.latest().map(|s| s.price), Some(2.0));
        assert_eq!(series.previous().map(|s| s.price), Some(1.0));
    }

    #[test]
    fn last_n_clamps_to_length() {
        let series = PriceSeries::from_samples(10, (0..4).map(|i| flat(i, i as f64)));

        let tail: Vec<f64> = series.last_n(2).map(|s| s.price).collect();
        assert_eq!(tail, vec![2.0, 3.0]);
        assert_eq!(series.last_n(20).count(), 4);
    }

    #[test]
    fn from_samples_keeps_newest() {
        let series = PriceSeries::from_samples(2, (0..5).map(|i| flat(i, i as f64)));
        let prices: Vec<f64> = series.iter().map(|s| s.price).collect();
        assert_eq!(prices, vec![3.0, 4.0]);
        assert_eq!(series.capacity(), 2);
    }
}
