use chrono::{Datelike, NaiveDate};
use tracing::debug;

use super::{require_points, ForecastModel, ModelForecast};
use crate::domain::TimeSeries;
use crate::forecast::{stats, ModelError};

const PERIOD: usize = 7;

/// Classical additive decomposition with a weekly period.
///
/// 1. Trend: centered 7-day moving average.
/// 2. Seasonal index: mean deviation from the trend per day of week,
///    re-centred so the seven indices sum to zero.
/// 3. Forecast: least-squares line through the trend against days since the
///    first observation, extrapolated, plus the seasonal index for the
///    forecast date's weekday. Gapped input keeps its calendar spacing.
///
/// The error estimate is the standard deviation of the residual left after
/// removing trend and seasonal index, constant across the horizon.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalDecompositionModel;

impl SeasonalDecompositionModel {
    pub const NAME: &'static str = "Seasonal Decomposition (period=7)";
    pub const MIN_DATA_POINTS: usize = 14;
}

impl ForecastModel for SeasonalDecompositionModel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Forecasting with weekly seasonal pattern recognition"
    }

    fn best_for(&self) -> &'static str {
        "Data with weekly or seasonal patterns"
    }

    fn min_data_points(&self) -> usize {
        Self::MIN_DATA_POINTS
    }

    fn forecast(&self, series: &TimeSeries, horizon: usize) -> Result<ModelForecast, ModelError> {
        require_points(Self::NAME, Self::MIN_DATA_POINTS, series)?;

        let ys = series.values();
        let weekdays: Vec<usize> = series.weekdays().collect();
        let trend = stats::centered_moving_average(ys, PERIOD);
        let first = series.first_date();
        let day_offset = |date: NaiveDate| (date - first).num_days() as f64;

        // (day offset, trend value) wherever the centered window fits
        let (xs, trend_values): (Vec<f64>, Vec<f64>) = trend
            .iter()
            .zip(series.dates())
            .filter_map(|(v, &date)| v.map(|v| (day_offset(date), v)))
            .unzip();

        let mut sums = [0.0; PERIOD];
        let mut counts = [0usize; PERIOD];
        for (t, v) in trend.iter().enumerate() {
            if let Some(v) = v {
                sums[weekdays[t]] += ys[t] - v;
                counts[weekdays[t]] += 1;
            }
        }
        if let Some(day) = counts.iter().position(|&c| c == 0) {
            return Err(ModelError::numerical(
                Self::NAME,
                format!("no detrended observation for weekday {day}"),
            ));
        }

        let mut seasonal: [f64; PERIOD] =
            std::array::from_fn(|day| sums[day] / counts[day] as f64);
        let offset = stats::mean(&seasonal);
        seasonal.iter_mut().for_each(|s| *s -= offset);

        let residuals: Vec<f64> = trend
            .iter()
            .enumerate()
            .filter_map(|(t, v)| v.map(|v| ys[t] - v - seasonal[weekdays[t]]))
            .collect();
        let residual_std = stats::population_std_dev(&residuals);

        let trend_line = stats::least_squares(&xs, &trend_values)
            .ok_or_else(|| ModelError::numerical(Self::NAME, "degenerate trend fit"))?;

        debug!(
            slope = trend_line.slope,
            residual_std,
            ?seasonal,
            "seasonal decomposition"
        );

        let mut values = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            let date = series.date_after_end(step as u64).ok_or_else(|| {
                ModelError::numerical(Self::NAME, "forecast date out of calendar range")
            })?;
            let weekday = date.weekday().num_days_from_monday() as usize;
            values.push(trend_line.at(day_offset(date)) + seasonal[weekday]);
        }

        ModelForecast::checked(Self::NAME, values, vec![residual_std; horizon])
    }
}
