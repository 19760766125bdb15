use super::{require_points, ForecastModel, ModelForecast};
use crate::domain::TimeSeries;
use crate::forecast::{stats, ModelError};

/// Mean of the most recent window, nudged by the change between the two
/// latest windows.
///
/// With `w = min(7, n)`, the base level is the mean of the last `w` points
/// and the per-day trend is `(recent mean - previous mean) / w`, where the
/// previous window is the (up to) `w` points before the recent one. When
/// there is no previous window the trend is zero. The error estimate is the
/// standard deviation of the recent window, constant across the horizon.
#[derive(Debug, Clone, Copy)]
pub struct MovingAverageModel {
    window: usize,
}

impl MovingAverageModel {
    pub const NAME: &'static str = "Moving Average (window=7)";
    pub const MIN_DATA_POINTS: usize = 5;
    pub const DEFAULT_WINDOW: usize = 7;

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for MovingAverageModel {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
        }
    }
}

impl ForecastModel for MovingAverageModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Smoothing-based forecasting using moving averages"
    }

    fn best_for(&self) -> &'static str {
        "Data with noise that needs smoothing"
    }

    fn min_data_points(&self) -> usize {
        Self::MIN_DATA_POINTS
    }

    fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ModelForecast, ModelError> {
        require_points(Self::NAME, Self::MIN_DATA_POINTS, series)?;

        let ys = series.values();
        let n = ys.len();
        let w = self.window.min(n);

        let recent = &ys[n - w..];
        let previous = &ys[n.saturating_sub(2 * w)..n - w];

        let base = stats::mean(recent);
        let trend = if previous.is_empty() {
            0.0
        } else {
            (base - stats::mean(previous)) / w as f64
        };
        let spread = stats::population_std_dev(recent);

        let values = (1..=horizon).map(|step| base + trend * step as f64).collect();
        ModelForecast::checked(Self::NAME, values, vec![spread; horizon])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::models::test_support::{assert_close, constant, series};

    #[test]
    fn test_constant_series() {
        let forecast = MovingAverageModel::default()
            .forecast(&constant(80.0, 20), 4)
            .unwrap();
        forecast.values.iter().for_each(|v| assert_close(*v, 80.0));
        forecast.errors.iter().for_each(|e| assert_close(*e, 0.0));
    }

    #[test]
    fn test_window_shrinks_to_series_length() {
        // n = 5: one window, no previous window, so no trend
        let forecast = MovingAverageModel::default()
            .forecast(&series(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3)
            .unwrap();
        forecast.values.iter().for_each(|v| assert_close(*v, 30.0));
        assert_close(forecast.errors[0], 200.0_f64.sqrt());
    }

    #[test]
    fn test_trend_between_windows() {
        // previous window mean 10, recent window mean 24, w = 7 -> trend 2/day
        let mut values = vec![10.0; 7];
        values.extend(vec![24.0; 7]);
        let forecast = MovingAverageModel::default()
            .forecast(&series(&values), 3)
            .unwrap();
        assert_close(forecast.values[0], 26.0);
        assert_close(forecast.values[1], 28.0);
        assert_close(forecast.values[2], 30.0);
    }

    #[test]
    fn test_partial_previous_window() {
        // n = 9, w = 7: previous window is the first two points
        let values = [0.0, 0.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0];
        let forecast = MovingAverageModel::default()
            .forecast(&series(&values), 1)
            .unwrap();
        assert_close(forecast.values[0], 8.0);
    }

    #[test]
    fn test_declines_short_series() {
        assert!(MovingAverageModel::default()
            .forecast(&series(&[1.0, 2.0, 3.0, 4.0]), 2)
            .is_err());
    }
}
