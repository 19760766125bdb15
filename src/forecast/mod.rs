pub mod confidence;
pub mod engine;
pub mod ensemble;
pub mod error;
pub mod fallback;
pub mod metrics;
pub mod models;
pub mod stats;

pub use confidence::*;
pub use engine::*;
pub use ensemble::*;
pub use error::*;
pub use fallback::*;
pub use metrics::*;
pub use models::{ForecastModel, ModelForecast};
