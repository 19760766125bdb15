use tracing::debug;

use super::{require_points, ForecastModel, ModelForecast};
use crate::domain::TimeSeries;
use crate::forecast::{stats, ModelError};

/// ARIMA(1,1,0) without intercept.
///
/// The series is differenced once, `φ` is fitted on `Δ_t = φ Δ_{t-1}` by
/// least squares through the origin, and future differences are rolled
/// forward recursively and integrated from the last observation.
///
/// `φ` is clamped to `[-1, 1]` so forecasts cannot explode; a constant
/// trend (all differences equal) gives `φ = 1` and is extrapolated exactly.
/// A series with no movement at all gives `φ = 0`. The error estimate is the
/// standard deviation of the one-step residuals on the differenced series.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoregressiveModel;

impl AutoregressiveModel {
    pub const NAME: &'static str = "Simple ARIMA (1,1,0)";
    pub const MIN_DATA_POINTS: usize = 7;
}

impl ForecastModel for AutoregressiveModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Autoregressive forecasting on day-to-day changes"
    }

    fn best_for(&self) -> &'static str {
        "Time series with trends and autocorrelation"
    }

    fn min_data_points(&self) -> usize {
        Self::MIN_DATA_POINTS
    }

    fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ModelForecast, ModelError> {
        require_points(Self::NAME, Self::MIN_DATA_POINTS, series)?;

        let ys = series.values();
        let diffs: Vec<f64> = ys.windows(2).map(|w| w[1] - w[0]).collect();

        let (cross, lagged_sq) = diffs
            .windows(2)
            .fold((0.0, 0.0), |(cross, sq), w| (cross + w[1] * w[0], sq + w[0] * w[0]));

        let phi = if lagged_sq < stats::EPSILON {
            if diffs.iter().all(|d| d.abs() < stats::EPSILON) {
                0.0
            } else {
                return Err(ModelError::numerical(
                    Self::NAME,
                    "singular autoregression fit: lagged differences are all zero",
                ));
            }
        } else {
            (cross / lagged_sq).clamp(-1.0, 1.0)
        };

        let residuals: Vec<f64> = diffs.windows(2).map(|w| w[1] - phi * w[0]).collect();
        let sigma = stats::population_std_dev(&residuals);

        debug!(phi, sigma, "autoregression fit");

        let mut level = series.last_value();
        let mut diff = diffs[diffs.len() - 1];
        let values = (0..horizon)
            .map(|_| {
                diff *= phi;
                level += diff;
                level
            })
            .collect();

        ModelForecast::checked(Self::NAME, values, vec![sigma; horizon])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::models::test_support::{assert_close, constant, linear, series};

    #[test]
    fn test_constant_series() {
        let forecast = AutoregressiveModel.forecast(&constant(33.0, 10), 5).unwrap();
        forecast.values.iter().for_each(|v| assert_close(*v, 33.0));
        forecast.errors.iter().for_each(|e| assert_close(*e, 0.0));
    }

    #[test]
    fn test_linear_series_extrapolated() {
        let forecast = AutoregressiveModel
            .forecast(&linear(40.0, -1.5, 10), 3)
            .unwrap();
        assert_close(forecast.values[0], 40.0 - 1.5 * 10.0);
        assert_close(forecast.values[2], 40.0 - 1.5 * 12.0);
    }

    #[test]
    fn test_alternating_changes_mean_revert() {
        // Differences alternate +4/-4, so φ = -1 and the forecast oscillates
        let forecast = AutoregressiveModel
            .forecast(&series(&[50.0, 54.0, 50.0, 54.0, 50.0, 54.0, 50.0]), 2)
            .unwrap();
        assert_close(forecast.values[0], 54.0);
        assert_close(forecast.values[1], 50.0);
    }

    #[test]
    fn test_singular_fit_is_numerical_error() {
        // Flat until the final jump: every lagged difference is zero
        let err = AutoregressiveModel
            .forecast(&series(&[20.0, 20.0, 20.0, 20.0, 20.0, 20.0, 35.0]), 2)
            .unwrap_err();
        assert!(matches!(err, ModelError::Numerical { .. }));
    }

    #[test]
    fn test_declines_short_series() {
        assert!(AutoregressiveModel.forecast(&constant(10.0, 6), 2).is_err());
    }
}
