//! Weather inputs for SkyCast
//!
//! Provides current conditions via Open-Meteo and the `WeatherSnapshot` value the
//! recommendation engine filters on.

pub mod provider;
pub mod types;

pub use provider::{WeatherProvider, DEFAULT_API_URL};
pub use types::*;
