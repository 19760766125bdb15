//! Forecast Models
//!
//! Each model consumes a validated [`TimeSeries`] and produces point forecasts
//! with a per-step error estimate:
//! - Linear regression on the day index
//! - Moving average with a window-to-window trend
//! - Holt double exponential smoothing
//! - Weekly seasonal decomposition
//! - First-order autoregression on the differenced series
//!
//! Models are stateless and deterministic. A model that cannot produce a
//! reliable forecast returns a [`ModelError`]; fallback is the caller's job.

pub mod autoregressive;
pub mod exponential;
pub mod linear;
pub mod moving_average;
pub mod seasonal;

pub use autoregressive::*;
pub use exponential::*;
pub use linear::*;
pub use moving_average::*;
pub use seasonal::*;

use crate::domain::TimeSeries;

use super::ModelError;

#[cfg_attr(test, mockall::automock)]
pub trait ForecastModel: Send + Sync {
    /// Display name stamped into result metadata
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// What kind of data the model suits
    fn best_for(&self) -> &'static str;

    /// Fewer points than this and the model declines
    fn min_data_points(&self) -> usize;

    fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ModelForecast, ModelError>;
}

/// Point forecasts and matching error estimates, one entry per horizon day
#[derive(Debug, Clone, PartialEq)]
pub struct ModelForecast {
    pub values: Vec<f64>,
    pub errors: Vec<f64>,
}

impl ModelForecast {
    /// Build a forecast, rejecting non-finite output and mismatched lengths.
    /// Negative error estimates are clamped to zero.
    pub fn checked(
        model: &'static str,
        values: Vec<f64>,
        errors: Vec<f64>,
    ) -> Result<Self, ModelError> {
        if values.len() != errors.len() {
            return Err(ModelError::numerical(
                model,
                format!(
                    "{} forecasts but {} error estimates",
                    values.len(),
                    errors.len()
                ),
            ));
        }
        if let Some(step) = values
            .iter()
            .chain(errors.iter())
            .position(|v| !v.is_finite())
        {
            return Err(ModelError::numerical(
                model,
                format!("non-finite output at position {step}"),
            ));
        }

        Ok(Self {
            values,
            errors: errors.into_iter().map(|e| e.max(0.0)).collect(),
        })
    }

    pub fn horizon(&self) -> usize {
        self.values.len()
    }
}

/// Decline with `InsufficientData` when the series is too short
pub fn require_points(
    model: &'static str,
    required: usize,
    series: &TimeSeries,
) -> Result<(), ModelError> {
    if series.len() < required {
        return Err(ModelError::InsufficientData {
            model,
            required,
            available: series.len(),
        });
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::series;
    use super::*;

    #[test]
    fn test_checked_rejects_nan() {
        let err = ModelForecast::checked("Test", vec![1.0, f64::NAN], vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(err, ModelError::Numerical { model: "Test", .. }));
    }

    #[test]
    fn test_checked_rejects_length_mismatch() {
        assert!(ModelForecast::checked("Test", vec![1.0], vec![]).is_err());
    }

    #[test]
    fn test_checked_clamps_negative_errors() {
        let forecast = ModelForecast::checked("Test", vec![1.0], vec![-0.5]).unwrap();
        assert_eq!(forecast.errors, vec![0.0]);
        assert_eq!(forecast.horizon(), 1);
    }

    #[test]
    fn test_require_points() {
        let s = series(&[1.0, 2.0]);
        assert!(require_points("Test", 2, &s).is_ok());
        assert_eq!(
            require_points("Test", 3, &s),
            Err(ModelError::InsufficientData {
                model: "Test",
                required: 3,
                available: 2
            })
        );
    }
}
