use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// `RUST_LOG` wins over the configured directive
fn env_filter(cfg: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&cfg.filter)
            .with_context(|| format!("invalid log filter {:?}", cfg.filter)),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for forecast output.
pub fn init_tracing(cfg: &LoggingConfig) -> Result<()> {
    let fmt_layer = if cfg.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter(cfg)?)
        .with(fmt_layer)
        .try_init()
        .context("tracing subscriber already installed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_filter_parses() {
        let cfg = LoggingConfig {
            filter: "warn,aqi_forecast=debug".to_string(),
            json: true,
        };
        assert!(env_filter(&cfg).is_ok());
    }

    #[test]
    fn test_second_init_is_an_error() {
        let cfg = LoggingConfig::default();
        // the first call may lose to another test
        let _ = init_tracing(&cfg);
        assert!(init_tracing(&cfg).is_err());
    }
}
