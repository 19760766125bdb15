//! Ensemble combiner
//!
//! Runs every eligible model, keeps the successes, and merges them day by
//! day. The combined error for a day is the population standard deviation
//! of the members' forecasts for that day: disagreement between models is
//! the uncertainty signal. A lone survivor keeps its own error estimate.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{debug, warn};

use super::metrics::holdout_backtest;
use super::models::{ForecastModel, ModelForecast};
use super::{stats, ModelError};
use crate::domain::TimeSeries;

/// Floor for backtest RMSE when converting to inverse-error weights
const MIN_WEIGHT_ERROR: f64 = 1e-3;

/// How member forecasts are weighted
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WeightingPolicy {
    /// Every successful member counts the same
    #[default]
    Equal,
    /// Weight proportional to 1 / RMSE of a hold-out backtest: the member
    /// is refitted on the series minus its last `holdout_len(n)` points
    /// and scored on those points, never on data it was fitted to. RMSE is
    /// floored at 1e-3. Falls back to equal weights when any successful
    /// member cannot be backtested.
    InverseError,
}

/// Outcome of one member run, success or failure
pub struct MemberOutcome {
    pub model: Arc<dyn ForecastModel>,
    pub result: Result<ModelForecast, ModelError>,
}

/// Combined forecast plus who contributed and with what weight
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleForecast {
    pub forecast: ModelForecast,
    pub members: Vec<&'static str>,
    pub weights: Vec<f64>,
}

pub struct EnsembleCombiner {
    members: Vec<Arc<dyn ForecastModel>>,
    weighting: WeightingPolicy,
}

impl EnsembleCombiner {
    pub const NAME: &'static str = "Ensemble (Multiple Models)";
    pub const DESCRIPTION: &'static str =
        "Combines multiple forecasting methods for improved accuracy";
    pub const BEST_FOR: &'static str = "General purpose forecasting with improved accuracy";

    pub fn new(members: Vec<Arc<dyn ForecastModel>>, weighting: WeightingPolicy) -> Self {
        Self { members, weighting }
    }

    pub fn weighting(&self) -> WeightingPolicy {
        self.weighting
    }

    pub fn members(&self) -> &[Arc<dyn ForecastModel>] {
        &self.members
    }

    /// Smallest minimum across members; below this nothing can run
    pub fn min_data_points(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.min_data_points())
            .min()
            .unwrap_or(usize::MAX)
    }

    /// Members whose minimum-data requirement `series` satisfies, in
    /// registration order
    pub fn eligible(&self, series: &TimeSeries) -> Vec<Arc<dyn ForecastModel>> {
        self.members
            .iter()
            .filter(|m| {
                let ok = series.len() >= m.min_data_points();
                if !ok {
                    debug!(
                        model = m.name(),
                        required = m.min_data_points(),
                        available = series.len(),
                        "ensemble member skipped"
                    );
                }
                ok
            })
            .cloned()
            .collect()
    }

    /// Run eligible members one after another and combine
    pub fn forecast(
        &self,
        series: &TimeSeries,
        horizon: usize,
    ) -> Result<EnsembleForecast, ModelError> {
        let outcomes = self
            .eligible(series)
            .into_iter()
            .map(|model| {
                let result = model.forecast(series, horizon);
                MemberOutcome { model, result }
            })
            .collect();
        self.combine(series, horizon, outcomes)
    }

    /// Merge member outcomes. Failures are logged and dropped.
    pub fn combine(
        &self,
        series: &TimeSeries,
        horizon: usize,
        outcomes: Vec<MemberOutcome>,
    ) -> Result<EnsembleForecast, ModelError> {
        let attempted = outcomes.len();
        let successes: Vec<(Arc<dyn ForecastModel>, ModelForecast)> = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome.result {
                Ok(forecast) if forecast.horizon() == horizon => Some((outcome.model, forecast)),
                Ok(forecast) => {
                    warn!(
                        model = outcome.model.name(),
                        expected = horizon,
                        got = forecast.horizon(),
                        "ensemble member returned wrong horizon, excluded"
                    );
                    None
                }
                Err(error) => {
                    warn!(model = outcome.model.name(), %error, "ensemble member excluded");
                    None
                }
            })
            .collect();

        if successes.is_empty() {
            return Err(ModelError::EnsembleExhausted { attempted });
        }

        let weights = self.weights(series, &successes);
        let members: Vec<&'static str> = successes.iter().map(|(m, _)| m.name()).collect();

        let forecast = if let [(_, only)] = successes.as_slice() {
            only.clone()
        } else {
            let mut values = Vec::with_capacity(horizon);
            let mut errors = Vec::with_capacity(horizon);
            for day in 0..horizon {
                let day_values: Vec<f64> = successes.iter().map(|(_, f)| f.values[day]).collect();
                values.push(
                    day_values
                        .iter()
                        .zip(&weights)
                        .map(|(v, w)| v * w)
                        .sum::<f64>(),
                );
                errors.push(stats::population_std_dev(&day_values));
            }
            ModelForecast::checked(Self::NAME, values, errors)?
        };

        debug!(?members, ?weights, "ensemble combined");

        Ok(EnsembleForecast {
            forecast,
            members,
            weights,
        })
    }

    /// Normalised weights, one per success, in order
    fn weights(
        &self,
        series: &TimeSeries,
        successes: &[(Arc<dyn ForecastModel>, ModelForecast)],
    ) -> Vec<f64> {
        let equal = vec![1.0 / successes.len() as f64; successes.len()];

        match self.weighting {
            WeightingPolicy::Equal => equal,
            WeightingPolicy::InverseError => {
                let inverse: Option<Vec<f64>> = successes
                    .iter()
                    .map(|(model, _)| {
                        holdout_backtest(model.as_ref(), series)
                            .map(|metrics| 1.0 / metrics.rmse.max(MIN_WEIGHT_ERROR))
                    })
                    .collect();

                match inverse {
                    Some(inverse) => {
                        let total: f64 = inverse.iter().sum();
                        inverse.iter().map(|w| w / total).collect()
                    }
                    None => {
                        debug!("backtest unavailable for some members, using equal weights");
                        equal
                    }
                }
            }
        }
    }
}
