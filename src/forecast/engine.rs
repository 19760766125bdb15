//! Forecasting service
//!
//! Validates requests, dispatches to a single model or the ensemble, falls
//! back to last-value-carried-forward when the chosen path declines, and
//! assembles dated predictions with confidence bands and AQI categories.

use std::collections::HashMap;
use std::sync::Arc;

use strum::IntoEnumIterator;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use super::confidence::ConfidenceEstimator;
use super::ensemble::{EnsembleCombiner, EnsembleForecast, MemberOutcome};
use super::fallback::FallbackForecaster;
use super::metrics::{holdout_backtest, ForecastMetrics};
use super::models::{
    AutoregressiveModel, ExponentialSmoothingModel, ForecastModel, LinearRegressionModel,
    ModelForecast, MovingAverageModel, SeasonalDecompositionModel,
};
use super::{ForecastError, ModelError};
use crate::config::ForecastConfig;
use crate::domain::{
    ConfidenceBand, ConfidenceLevel, ForecastMetadata, ForecastMethod,
    ForecastRequest, ForecastResult, MethodInfo, PredictionPoint, TimeSeries,
};

/// Single-model methods in ensemble member order
pub const MODEL_METHODS: [ForecastMethod; 5] = [
    ForecastMethod::Linear,
    ForecastMethod::MovingAverage,
    ForecastMethod::ExponentialSmoothing,
    ForecastMethod::Seasonal,
    ForecastMethod::Arima,
];

/// What a model path produced before dating and banding
struct Produced {
    model_name: String,
    forecast: ModelForecast,
    members: Vec<String>,
}

impl From<EnsembleForecast> for Produced {
    fn from(ensemble: EnsembleForecast) -> Self {
        Self {
            model_name: EnsembleCombiner::NAME.to_string(),
            forecast: ensemble.forecast,
            members: ensemble.members.into_iter().map(String::from).collect(),
        }
    }
}

pub struct ForecastingService {
    config: ForecastConfig,
    models: HashMap<ForecastMethod, Arc<dyn ForecastModel>>,
    ensemble: EnsembleCombiner,
    fallback: FallbackForecaster,
    confidence: ConfidenceEstimator,
}

impl ForecastingService {
    pub fn new(config: ForecastConfig) -> Self {
        let registry: [(ForecastMethod, Arc<dyn ForecastModel>); 5] = [
            (ForecastMethod::Linear, Arc::new(LinearRegressionModel)),
            (
                ForecastMethod::MovingAverage,
                Arc::new(MovingAverageModel::default()),
            ),
            (
                ForecastMethod::ExponentialSmoothing,
                Arc::new(ExponentialSmoothingModel),
            ),
            (ForecastMethod::Seasonal, Arc::new(SeasonalDecompositionModel)),
            (ForecastMethod::Arima, Arc::new(AutoregressiveModel)),
        ];
        let models = HashMap::from(registry);
        let ensemble = Self::build_ensemble(&models, &config);

        Self {
            config,
            models,
            ensemble,
            fallback: FallbackForecaster,
            confidence: ConfidenceEstimator::default(),
        }
    }

    /// Replace the model behind a single-model method. The ensemble picks up
    /// the replacement too. `Ensemble` itself cannot be replaced and is
    /// ignored.
    pub fn with_model(mut self, method: ForecastMethod, model: Arc<dyn ForecastModel>) -> Self {
        if method == ForecastMethod::Ensemble {
            warn!("ignoring attempt to replace the ensemble combiner");
            return self;
        }
        self.models.insert(method, model);
        self.ensemble = Self::build_ensemble(&self.models, &self.config);
        self
    }

    fn build_ensemble(
        models: &HashMap<ForecastMethod, Arc<dyn ForecastModel>>,
        config: &ForecastConfig,
    ) -> EnsembleCombiner {
        let members = MODEL_METHODS
            .iter()
            .filter_map(|method| models.get(method).cloned())
            .collect();
        EnsembleCombiner::new(members, config.weighting)
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Produce a forecast, running ensemble members one after another.
    ///
    /// Only malformed requests fail; any model failure degrades to the
    /// fallback forecaster.
    #[instrument(skip(self, request), fields(method = %request.method, horizon = request.horizon))]
    pub fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResult, ForecastError> {
        let series = self.prepare(request)?;
        let produced = match request.method {
            ForecastMethod::Ensemble => self
                .ensemble
                .forecast(&series, request.horizon)
                .map(Produced::from),
            method => self.run_single(method, &series, request.horizon),
        };
        self.assemble(request, &series, produced)
    }

    /// Same result as [`forecast`](Self::forecast), but ensemble members run
    /// on the blocking pool in parallel, each under the configured time
    /// budget. A member that times out or panics is excluded like any other
    /// failing member.
    #[instrument(skip(self, request), fields(method = %request.method, horizon = request.horizon))]
    pub async fn forecast_concurrent(
        &self,
        request: &ForecastRequest,
    ) -> Result<ForecastResult, ForecastError> {
        if request.method != ForecastMethod::Ensemble {
            return self.forecast(request);
        }

        let series = self.prepare(request)?;
        let outcomes = self.run_members(&series, request.horizon).await;
        let produced = self
            .ensemble
            .combine(&series, request.horizon, outcomes)
            .map(Produced::from);
        self.assemble(request, &series, produced)
    }

    /// Methods callers may request, ensemble last
    pub fn available_methods(&self) -> Vec<ForecastMethod> {
        ForecastMethod::iter().collect()
    }

    pub fn method_info(&self, method: ForecastMethod) -> Option<MethodInfo> {
        if method == ForecastMethod::Ensemble {
            return Some(MethodInfo {
                method,
                name: EnsembleCombiner::NAME.to_string(),
                description: EnsembleCombiner::DESCRIPTION.to_string(),
                min_data_points: self.ensemble.min_data_points(),
                best_for: EnsembleCombiner::BEST_FOR.to_string(),
            });
        }

        self.models.get(&method).map(|model| MethodInfo {
            method,
            name: model.name().to_string(),
            description: model.description().to_string(),
            min_data_points: model.min_data_points(),
            best_for: model.best_for().to_string(),
        })
    }

    pub fn method_catalogue(&self) -> Vec<MethodInfo> {
        self.available_methods()
            .into_iter()
            .filter_map(|method| self.method_info(method))
            .collect()
    }

    /// Hold-out accuracy of a single-model method on `series`.
    ///
    /// `None` for the ensemble, or when the series is too short to leave a
    /// training head the model accepts.
    pub fn backtest(&self, series: &TimeSeries, method: ForecastMethod) -> Option<ForecastMetrics> {
        let model = self.models.get(&method)?;
        let metrics = holdout_backtest(model.as_ref(), series)?;
        debug!(%method, %metrics, "backtest complete");
        Some(metrics)
    }

    fn prepare(&self, request: &ForecastRequest) -> Result<TimeSeries, ForecastError> {
        request.validate()?;

        if request.horizon > self.config.max_horizon_days {
            return Err(ForecastError::HorizonTooLarge {
                requested: request.horizon,
                max: self.config.max_horizon_days,
            });
        }

        let series = TimeSeries::new(&request.series)?;
        series
            .date_after_end(request.horizon as u64)
            .ok_or(ForecastError::DateOutOfRange)?;
        Ok(series)
    }

    fn run_single(
        &self,
        method: ForecastMethod,
        series: &TimeSeries,
        horizon: usize,
    ) -> Result<Produced, ModelError> {
        let model = self.models.get(&method).ok_or_else(|| {
            ModelError::numerical("registry", format!("no model registered for {method}"))
        })?;

        let forecast = model.forecast(series, horizon)?;
        if forecast.horizon() != horizon {
            return Err(ModelError::numerical(
                model.name(),
                format!("expected {horizon} forecasts, got {}", forecast.horizon()),
            ));
        }

        Ok(Produced {
            model_name: model.name().to_string(),
            forecast,
            members: Vec::new(),
        })
    }

    /// Run eligible ensemble members concurrently. Outcomes come back in
    /// member order regardless of completion order.
    async fn run_members(&self, series: &TimeSeries, horizon: usize) -> Vec<MemberOutcome> {
        let eligible = self.ensemble.eligible(series);
        let shared = Arc::new(series.clone());
        let budget = self.config.model_timeout();

        let mut tasks = JoinSet::new();
        for (index, model) in eligible.iter().enumerate() {
            let model = Arc::clone(model);
            let series = Arc::clone(&shared);
            tasks.spawn(async move {
                let name = model.name();
                let handle = tokio::task::spawn_blocking(move || model.forecast(&series, horizon));
                let result = match budget {
                    Some(budget) => match timeout(budget, handle).await {
                        Ok(joined) => {
                            joined.unwrap_or_else(|_| Err(ModelError::Panicked { model: name }))
                        }
                        Err(_) => Err(ModelError::TimedOut { model: name }),
                    },
                    None => handle
                        .await
                        .unwrap_or_else(|_| Err(ModelError::Panicked { model: name })),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<ModelForecast, ModelError>>> =
            (0..eligible.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(error) => warn!(%error, "ensemble task failed to join"),
            }
        }

        eligible
            .into_iter()
            .zip(slots)
            .map(|(model, slot)| {
                let name = model.name();
                MemberOutcome {
                    model,
                    result: slot.unwrap_or(Err(ModelError::Panicked { model: name })),
                }
            })
            .collect()
    }

    fn assemble(
        &self,
        request: &ForecastRequest,
        series: &TimeSeries,
        produced: Result<Produced, ModelError>,
    ) -> Result<ForecastResult, ForecastError> {
        let (model_name, days, members, used_fallback) = match produced {
            Ok(produced) => {
                let values: Vec<f64> = produced
                    .forecast
                    .values
                    .iter()
                    .map(|v| v.max(0.0))
                    .collect();
                let bands = self.confidence.bands(&values, &produced.forecast.errors);
                let days: Vec<(f64, ConfidenceBand)> = values.into_iter().zip(bands).collect();
                (produced.model_name, days, produced.members, false)
            }
            Err(error) => {
                warn!(method = %request.method, %error, "model declined, carrying last value forward");
                (
                    FallbackForecaster::NAME.to_string(),
                    self.fallback.forecast(series, request.horizon),
                    Vec::new(),
                    true,
                )
            }
        };

        let predictions = days
            .into_iter()
            .enumerate()
            .map(|(step, (value, confidence))| {
                let date = series
                    .date_after_end(step as u64 + 1)
                    .ok_or(ForecastError::DateOutOfRange)?;
                Ok(PredictionPoint::new(date, value, confidence))
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;

        let confidence_level = if used_fallback {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::from_data_points(series.len())
        };

        info!(
            model = %model_name,
            data_points = series.len(),
            %confidence_level,
            used_fallback,
            "forecast generated"
        );

        Ok(ForecastResult {
            predictions,
            metadata: ForecastMetadata {
                model_name,
                method: request.method,
                data_points: series.len(),
                confidence_level,
                used_fallback,
                ensemble_members: members,
            },
        })
    }
}

impl Default for ForecastingService {
    fn default() -> Self {
        Self::new(ForecastConfig::default())
    }
}
