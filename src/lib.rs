//! Offline AQI forecasting.
//!
//! Five classical single-series models, an ensemble combiner, calibrated
//! 80%/95% confidence bands and a last-value fallback, behind
//! [`forecast::ForecastingService`].

pub mod config;
pub mod domain;
pub mod forecast;
pub mod telemetry;
