//! Holt's linear (double) exponential smoothing.
//!
//! ```text
//! Level:    L_t = α y_t + (1 - α)(L_{t-1} + T_{t-1})
//! Trend:    T_t = β (L_t - L_{t-1}) + (1 - β) T_{t-1}
//! Forecast: F_{n+h} = L_n + h T_n
//! ```
//!
//! Initialised with `L_0 = y_0`, `T_0 = y_1 - y_0`. The smoothing constants
//! are fixed so results are reproducible across runs.

use super::{require_points, ForecastModel, ModelForecast};
use crate::domain::TimeSeries;
use crate::forecast::{stats, ModelError};

/// Level smoothing constant
pub const LEVEL_ALPHA: f64 = 0.3;
/// Trend smoothing constant
pub const TREND_BETA: f64 = 0.1;

/// The error estimate is the RMS of the one-step-ahead in-sample errors,
/// scaled by `sqrt(h)` for step `h` to reflect compounding uncertainty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialSmoothingModel;

impl ExponentialSmoothingModel {
    pub const NAME: &'static str = "Exponential Smoothing (α=0.3, β=0.1)";
    pub const MIN_DATA_POINTS: usize = 3;
}

impl ForecastModel for ExponentialSmoothingModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Weighted average forecasting with exponential decay and a damped-in trend"
    }

    fn best_for(&self) -> &'static str {
        "Data with recent trends and patterns"
    }

    fn min_data_points(&self) -> usize {
        Self::MIN_DATA_POINTS
    }

    fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ModelForecast, ModelError> {
        require_points(Self::NAME, Self::MIN_DATA_POINTS, series)?;

        let ys = series.values();
        let mut level = ys[0];
        let mut trend = ys[1] - ys[0];
        let mut one_step_errors = Vec::with_capacity(ys.len().saturating_sub(2));

        for (t, &y) in ys.iter().enumerate().skip(1) {
            // t = 1 is reproduced exactly by the initial trend
            if t >= 2 {
                one_step_errors.push(y - (level + trend));
            }
            let previous_level = level;
            level = LEVEL_ALPHA * y + (1.0 - LEVEL_ALPHA) * (level + trend);
            trend = TREND_BETA * (level - previous_level) + (1.0 - TREND_BETA) * trend;
        }

        let sigma = stats::root_mean_square(&one_step_errors);

        let (values, errors): (Vec<f64>, Vec<f64>) = (1..=horizon)
            .map(|step| {
                let h = step as f64;
                (level + h * trend, sigma * h.sqrt())
            })
            .unzip();

        ModelForecast::checked(Self::NAME, values, errors)
    }
}
