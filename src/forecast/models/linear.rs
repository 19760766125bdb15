use tracing::debug;

use super::{require_points, ForecastModel, ModelForecast};
use crate::domain::TimeSeries;
use crate::forecast::{stats, ModelError};

/// Straight-line trend fitted by ordinary least squares on the day index.
///
/// The error estimate is the residual standard deviation of the fit
/// (`sqrt(SSE / (n - 2))`) and stays constant across the horizon.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRegressionModel;

impl LinearRegressionModel {
    pub const NAME: &'static str = "Linear Regression";
    pub const MIN_DATA_POINTS: usize = 3;
}

impl ForecastModel for LinearRegressionModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Linear trend-based forecasting using least squares regression"
    }

    fn best_for(&self) -> &'static str {
        "Data with clear linear trends"
    }

    fn min_data_points(&self) -> usize {
        Self::MIN_DATA_POINTS
    }

    fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ModelForecast, ModelError> {
        require_points(Self::NAME, Self::MIN_DATA_POINTS, series)?;

        let ys = series.values();
        let n = ys.len();
        let xs: Vec<f64> = (0..n).map(|t| t as f64).collect();

        let fit = stats::least_squares(&xs, ys)
            .ok_or_else(|| ModelError::numerical(Self::NAME, "singular least squares fit"))?;

        let sse: f64 = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| (y - fit.at(x)).powi(2))
            .sum();
        let residual_std = (sse / (n - 2) as f64).sqrt();

        debug!(
            slope = fit.slope,
            intercept = fit.intercept,
            residual_std,
            "linear fit"
        );

        let values = (0..horizon).map(|h| fit.at((n + h) as f64)).collect();
        ModelForecast::checked(Self::NAME, values, vec![residual_std; horizon])
    }
}
