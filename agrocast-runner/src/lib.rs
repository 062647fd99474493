//! Agrocast Runner: forecast orchestration on top of `agrocast-core`.
//!
//! This crate provides:
//! - TOML configuration with validated per-domain tables
//! - Observation feeds (Data.gov.in prices, OpenWeather conditions) with
//!   fallback substitution
//! - Weather history synthesis when a feed has none
//! - The price and weather forecast entry points and their payloads
//! - Risk roll-up, farming suggestions, and seeded parallel batches

pub mod batch;
pub mod config;
pub mod orchestrator;
pub mod provider;
pub mod report;
pub mod risk;
pub mod synth;

pub use batch::BatchForecaster;
pub use config::{ConfigError, ForecastConfig, HorizonPolicy, PriceConfig, WeatherConfig};
pub use orchestrator::{ForecastOrchestrator, PriceRequest, WeatherRequest};
pub use provider::{
    FeedError, PriceFeed, PriceObservations, SourceTag, WeatherFeed, WeatherObservations,
};
pub use report::{
    ForecastDay, HistorySource, MatrixBasis, PriceForecast, WeatherForecast, WeatherSummary,
};
pub use risk::{farming_suggestions, overall_risk};
pub use synth::{HistorySynthesizer, MarkovWeatherSynthesizer};
