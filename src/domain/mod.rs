pub mod aqi;
pub mod forecast;
pub mod types;

pub use aqi::*;
pub use forecast::*;
pub use types::*;
