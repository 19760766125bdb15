use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use validator::Validate;

use super::aqi::{is_threshold_exceeded, AqiCategory};
use super::types::{validate_chronology, HistoricalPoint};

/// Forecasting method requested by the caller
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ForecastMethod {
    Linear,
    MovingAverage,
    ExponentialSmoothing,
    Seasonal,
    /// Differenced first-order autoregression
    Arima,
    #[default]
    Ensemble,
}

/// Forecast confidence level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Trust grows with sample size alone: 14+ points is high, 7-13 medium.
    pub fn from_data_points(data_points: usize) -> Self {
        if data_points >= 14 {
            Self::High
        } else if data_points >= 7 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// 80% and 95% prediction interval around a point forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub low_80: f64,
    pub high_80: f64,
    pub low_95: f64,
    pub high_95: f64,
}

impl ConfidenceBand {
    /// `low_95 <= low_80 <= value <= high_80 <= high_95`, all non-negative
    pub fn contains_ordered(&self, value: f64) -> bool {
        self.low_95 >= 0.0
            && self.low_95 <= self.low_80
            && self.low_80 <= value
            && value <= self.high_80
            && self.high_80 <= self.high_95
    }

    pub fn width_95(&self) -> f64 {
        self.high_95 - self.low_95
    }
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    /// Unrounded model output, clamped at zero
    pub predicted_aqi: f64,
    /// `predicted_aqi` rounded to the nearest integer, as presented
    pub display_aqi: u32,
    pub category: AqiCategory,
    pub confidence: ConfidenceBand,
}

impl PredictionPoint {
    /// Negative input is clamped to zero. The category follows the rounded
    /// value.
    pub fn new(date: NaiveDate, predicted_aqi: f64, confidence: ConfidenceBand) -> Self {
        let predicted_aqi = predicted_aqi.max(0.0);
        let display_aqi = predicted_aqi.round() as u32;
        Self {
            date,
            predicted_aqi,
            display_aqi,
            category: AqiCategory::from_aqi(display_aqi as f64),
            confidence,
        }
    }

    /// Value shown to users; the category is derived from this.
    pub fn rounded_aqi(&self) -> u32 {
        self.predicted_aqi.round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetadata {
    /// Model (or combiner) that produced the predictions
    pub model_name: String,
    /// Method the caller asked for
    pub method: ForecastMethod,
    pub data_points: usize,
    pub confidence_level: ConfidenceLevel,
    pub used_fallback: bool,
    /// Models that contributed to an ensemble result
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ensemble_members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predictions: Vec<PredictionPoint>,
    pub metadata: ForecastMetadata,
}

impl ForecastResult {
    /// Forecast days whose rounded AQI is above `threshold`
    pub fn alerts(&self, threshold: f64) -> Vec<ForecastAlert> {
        self.predictions
            .iter()
            .filter(|p| is_threshold_exceeded(p.rounded_aqi() as f64, threshold))
            .map(|p| ForecastAlert {
                date: p.date,
                aqi: p.rounded_aqi(),
                category: p.category,
                message: format!("AQI > {threshold} predicted for {}", p.date),
            })
            .collect()
    }

    /// Highest forecast day
    pub fn peak(&self) -> Option<&PredictionPoint> {
        self.predictions
            .iter()
            .max_by(|a, b| a.predicted_aqi.total_cmp(&b.predicted_aqi))
    }
}

/// Forecast day exceeding an alert threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAlert {
    pub date: NaiveDate,
    pub aqi: u32,
    pub category: AqiCategory,
    pub message: String,
}

/// Input to the forecasting service
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForecastRequest {
    #[validate(
        length(min = 1, message = "series must contain at least one observation"),
        custom(function = "validate_chronology")
    )]
    pub series: Vec<HistoricalPoint>,

    #[validate(range(min = 1, message = "horizon must be at least one day"))]
    pub horizon: usize,

    #[serde(default)]
    pub method: ForecastMethod,
}

impl ForecastRequest {
    pub fn new(series: Vec<HistoricalPoint>, horizon: usize, method: ForecastMethod) -> Self {
        Self {
            series,
            horizon,
            method,
        }
    }
}

/// Catalogue entry describing a registered method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub method: ForecastMethod,
    pub name: String,
    pub description: String,
    pub min_data_points: usize,
    pub best_for: String,
}
