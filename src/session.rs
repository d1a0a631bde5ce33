// =============================================================================
// Session — The rolling series and its current analysis, owned together
// =============================================================================
//
// A session is created once at startup from the warm-up batch and lives for
// the life of the process. `update` is the only mutator: it appends one
// sample and replaces the analysis in the same call, so readers never see a
// series that disagrees with its analysis.
// =============================================================================

use uuid::Uuid;

use crate::indicators::{compute_analysis, Analysis};
use crate::market_data::{PriceSeries, Sample};

pub struct Session {
    id: Uuid,
    series: PriceSeries,
    analysis: Analysis,
    level_window: usize,
    /// Number of samples appended since the warm-up batch.
    updates: u64,
}

impl Session {
    /// Build a session from the initial batch and compute its first analysis.
    pub fn new(capacity: usize, level_window: usize, initial: Vec<Sample>) -> Self {
        let series = PriceSeries::from_samples(capacity, initial);
        let analysis = compute_analysis(&series, level_window, &Analysis::default());

        Self {
            id: Uuid::new_v4(),
            series,
            analysis,
            level_window,
            updates: 0,
        }
    }

    /// Append `sample`, recompute, and return the new analysis.
    pub fn update(&mut self, sample: Sample) -> Analysis {
        self.series.append(sample);
        self.analysis = compute_analysis(&self.series, self.level_window, &self.analysis);
        self.updates += 1;
        self.analysis.clone()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}
