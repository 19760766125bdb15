use thiserror::Error;

/// Why a single model declined to produce a forecast.
///
/// None of these reach the caller of the forecasting service; they steer
/// ensemble exclusion and fallback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{model} needs at least {required} data points, got {available}")]
    InsufficientData {
        model: &'static str,
        required: usize,
        available: usize,
    },

    #[error("{model} failed numerically: {reason}")]
    Numerical { model: &'static str, reason: String },

    #[error("{model} exceeded its time budget")]
    TimedOut { model: &'static str },

    #[error("{model} task aborted unexpectedly")]
    Panicked { model: &'static str },

    #[error("no ensemble member produced a forecast ({attempted} attempted)")]
    EnsembleExhausted { attempted: usize },
}

impl ModelError {
    pub fn numerical(model: &'static str, reason: impl Into<String>) -> Self {
        Self::Numerical {
            model,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the forecasting service. Only structurally invalid
/// requests produce these.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("invalid forecast request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("horizon of {requested} days exceeds the maximum of {max}")]
    HorizonTooLarge { requested: usize, max: usize },

    #[error("forecast dates run past the supported calendar range")]
    DateOutOfRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::InsufficientData {
            model: "Seasonal Decomposition",
            required: 14,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Seasonal Decomposition needs at least 14 data points, got 2"
        );

        let err = ModelError::numerical("Simple ARIMA", "singular fit");
        assert_eq!(err.to_string(), "Simple ARIMA failed numerically: singular fit");
    }

    #[test]
    fn test_horizon_error_display() {
        let err = ForecastError::HorizonTooLarge {
            requested: 45,
            max: 30,
        };
        assert_eq!(err.to_string(), "horizon of 45 days exceeds the maximum of 30");
    }
}
