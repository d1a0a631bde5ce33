// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free computations over the rolling price series. Nothing
// in here touches shared state; callers own the series and the previous
// analysis.

pub mod analysis;
pub mod readout;

pub use analysis::{compute_analysis, Analysis};
pub use readout::{QuoteSummary, Recommendation};

/// Round `value` to `decimals` fractional digits, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn rounds_to_requested_precision() {
        assert_eq!(round_to(2051.456, 2), 2051.46);
        assert_eq!(round_to(57.25, 1), 57.3);
        assert_eq!(round_to(-1.005, 0), -1.0);
        assert_eq!(round_to(100.0, 1), 100.0);
    }
}
