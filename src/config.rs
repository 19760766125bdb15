use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::ForecastMethod;
use crate::forecast::WeightingPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "AQIF__";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub forecast: ForecastConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub default_method: ForecastMethod,
    pub default_horizon_days: usize,
    pub max_horizon_days: usize,
    /// Per-model wall-clock budget on the concurrent path; 0 disables it
    pub model_timeout_ms: u64,
    pub weighting: WeightingPolicy,
    /// Predicted AQI above this raises an alert
    pub alert_threshold: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_method: ForecastMethod::Ensemble,
            default_horizon_days: 7,
            max_horizon_days: 30,
            model_timeout_ms: 2_000,
            weighting: WeightingPolicy::Equal,
            alert_threshold: 150.0,
        }
    }
}

impl ForecastConfig {
    pub fn model_timeout(&self) -> Option<Duration> {
        (self.model_timeout_ms > 0).then(|| Duration::from_millis(self.model_timeout_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,aqi_forecast=info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Defaults, then `config/default.toml` if present, then `AQIF__*` env vars
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::figment(path)
            .extract()
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.forecast.default_method, ForecastMethod::Ensemble);
        assert_eq!(cfg.forecast.max_horizon_days, 30);
        assert_eq!(
            cfg.forecast.model_timeout(),
            Some(Duration::from_millis(2_000))
        );
        assert!(!cfg.logging.json);
    }

    #[test]
    fn test_zero_timeout_disables_budget() {
        let cfg = ForecastConfig {
            model_timeout_ms: 0,
            ..ForecastConfig::default()
        };
        assert_eq!(cfg.model_timeout(), None);
    }

    #[test]
    fn test_toml_and_env_layering() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "forecast.toml",
                r#"
                [forecast]
                default_method = "seasonal"
                weighting = "inverse_error"
                max_horizon_days = 10
                "#,
            )?;
            jail.set_env("AQIF__FORECAST__MAX_HORIZON_DAYS", "14");
            jail.set_env("AQIF__LOGGING__JSON", "true");

            let cfg = Config::load_from("forecast.toml").map_err(|e| e.to_string())?;
            assert_eq!(cfg.forecast.default_method, ForecastMethod::Seasonal);
            assert_eq!(cfg.forecast.weighting, WeightingPolicy::InverseError);
            assert_eq!(cfg.forecast.max_horizon_days, 14);
            assert_eq!(cfg.forecast.default_horizon_days, 7);
            assert!(cfg.logging.json);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        figment::Jail::expect_with(|_| {
            let cfg = Config::load_from("does-not-exist.toml").map_err(|e| e.to_string())?;
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }
}
