//! Forecast Metrics and Backtesting
//!
//! Accuracy metrics (MAE, RMSE, MAPE, R²) and a hold-out backtest that
//! replays a model on the head of a series and scores it on the tail.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::ForecastModel;
use crate::domain::TimeSeries;

/// Longest hold-out used by [`holdout_backtest`]
pub const MAX_HOLDOUT: usize = 7;

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Square Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (%), over non-zero actuals
    pub mape: f64,
    /// R² (coefficient of determination)
    pub r2: f64,
    /// Number of samples evaluated
    pub sample_count: usize,
    /// Largest absolute error
    pub max_error: f64,
}

impl ForecastMetrics {
    /// Calculate metrics from actual and predicted values
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> Result<Self, ForecastMetricsError> {
        if actual.len() != predicted.len() {
            return Err(ForecastMetricsError::DimensionMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }

        if actual.is_empty() {
            return Err(ForecastMetricsError::EmptyData);
        }

        let n = actual.len() as f64;
        let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let sse: f64 = errors.iter().map(|e| e * e).sum();
        let rmse = (sse / n).sqrt();

        // Zero actuals (perfectly clean air) are skipped
        let percentage_errors: Vec<f64> = actual
            .iter()
            .zip(&errors)
            .filter(|(a, _)| a.abs() > 1e-6)
            .map(|(a, e)| e.abs() / a.abs() * 100.0)
            .collect();
        let mape = if percentage_errors.is_empty() {
            0.0
        } else {
            percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64
        };

        let mean_actual = actual.iter().sum::<f64>() / n;
        let total_variance: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
        let r2 = if total_variance > 1e-10 {
            1.0 - sse / total_variance
        } else if sse < 1e-10 {
            1.0
        } else {
            0.0
        };

        let max_error = errors.iter().map(|e| e.abs()).fold(0.0f64, f64::max);

        Ok(ForecastMetrics {
            mae,
            rmse,
            mape,
            r2,
            sample_count: actual.len(),
            max_error,
        })
    }
}

impl fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE={:.3}, RMSE={:.3}, MAPE={:.2}%, R²={:.3} over {} samples",
            self.mae, self.rmse, self.mape, self.r2, self.sample_count
        )
    }
}

/// Forecast metrics calculation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastMetricsError {
    #[error("Dimension mismatch: actual={actual}, predicted={predicted}")]
    DimensionMismatch { actual: usize, predicted: usize },

    #[error("Empty data provided")]
    EmptyData,
}

/// Hold-out length for a series of `len` points: a quarter of the series,
/// at least one day and at most [`MAX_HOLDOUT`].
pub fn holdout_len(len: usize) -> usize {
    (len / 4).clamp(1, MAX_HOLDOUT)
}

/// Fit `model` on all but the last [`holdout_len`] points and score its
/// forecast of those points.
///
/// Returns `None` when the training head is too short for the model or the
/// model declines.
pub fn holdout_backtest(model: &dyn ForecastModel, series: &TimeSeries) -> Option<ForecastMetrics> {
    let holdout = holdout_len(series.len());
    let train_len = series.len().checked_sub(holdout)?;
    if train_len < model.min_data_points().max(1) {
        return None;
    }

    let train = series.head(train_len);
    let forecast = model.forecast(&train, holdout).ok()?;
    ForecastMetrics::calculate(&series.values()[train_len..], &forecast.values).ok()
}
