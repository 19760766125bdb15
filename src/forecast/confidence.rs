//! Prediction intervals from an error estimate.
//!
//! The same formula serves single models (residual error) and the ensemble
//! (cross-model spread). Bounds are clamped at zero since AQI cannot be
//! negative.

use crate::domain::ConfidenceBand;

/// z-score for a two-sided 80% interval
pub const Z_80: f64 = 1.28;
/// z-score for a two-sided 95% interval
pub const Z_95: f64 = 1.96;

/// Turns a point forecast and its error estimate into a [`ConfidenceBand`]
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceEstimator {
    z_80: f64,
    z_95: f64,
}

impl Default for ConfidenceEstimator {
    fn default() -> Self {
        Self {
            z_80: Z_80,
            z_95: Z_95,
        }
    }
}

impl ConfidenceEstimator {
    /// Band around `forecast` with half-widths `z * error`.
    ///
    /// The forecast is expected to be non-negative already; a negative or
    /// non-finite `error` is treated as zero.
    pub fn band(&self, forecast: f64, error: f64) -> ConfidenceBand {
        let error = if error.is_finite() { error.max(0.0) } else { 0.0 };
        let margin_80 = self.z_80 * error;
        let margin_95 = self.z_95 * error;

        ConfidenceBand {
            low_80: (forecast - margin_80).max(0.0),
            high_80: forecast + margin_80,
            low_95: (forecast - margin_95).max(0.0),
            high_95: forecast + margin_95,
        }
    }

    /// Bands for a whole forecast; `forecasts` and `errors` are zipped.
    pub fn bands(&self, forecasts: &[f64], errors: &[f64]) -> Vec<ConfidenceBand> {
        forecasts
            .iter()
            .zip(errors)
            .map(|(&f, &e)| self.band(f, e))
            .collect()
    }
}

/// Fixed-proportion band used by the fallback forecaster
pub fn proportional_band(value: f64, fraction_80: f64, fraction_95: f64) -> ConfidenceBand {
    let value = value.max(0.0);
    ConfidenceBand {
        low_80: (value * (1.0 - fraction_80)).max(0.0),
        high_80: value * (1.0 + fraction_80),
        low_95: (value * (1.0 - fraction_95)).max(0.0),
        high_95: value * (1.0 + fraction_95),
    }
}
