use super::confidence::proportional_band;
use crate::domain::{ConfidenceBand, TimeSeries};

/// Half-width of the 80% fallback band, as a fraction of the value
pub const FALLBACK_BAND_80: f64 = 0.2;
/// Half-width of the 95% fallback band, as a fraction of the value
pub const FALLBACK_BAND_95: f64 = 0.4;

/// Last value carried forward, with a wide fixed-proportion band.
///
/// Used when the requested model, or every ensemble member, declines.
/// Never fails on a non-empty series.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackForecaster;

impl FallbackForecaster {
    pub const NAME: &'static str = "Last Value Carried Forward";

    pub fn forecast(&self, series: &TimeSeries, horizon: usize) -> Vec<(f64, ConfidenceBand)> {
        let last = series.last_value().max(0.0);
        let band = proportional_band(last, FALLBACK_BAND_80, FALLBACK_BAND_95);
        vec![(last, band); horizon]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::models::test_support::series;

    #[test]
    fn test_carries_last_value() {
        let out = FallbackForecaster.forecast(&series(&[40.0, 95.0]), 4);
        assert_eq!(out.len(), 4);
        for (value, band) in out {
            assert_eq!(value, 95.0);
            assert!((band.low_80 - 76.0).abs() < 1e-9);
            assert!((band.high_95 - 133.0).abs() < 1e-9);
            assert!(band.contains_ordered(value));
        }
    }

    #[test]
    fn test_single_point() {
        let out = FallbackForecaster.forecast(&series(&[12.0]), 1);
        assert_eq!(out[0].0, 12.0);
    }
}
