//! Observation collaborators and their fallback contract.
//!
//! The feed traits abstract over where observations come from (a live HTTP
//! API, the built-in fallback tables, or a test mock). A feed never fails
//! from the caller's point of view: transport and parse errors are absorbed
//! here and the fallback payload is returned instead, tagged
//! [`SourceTag::Fallback`].

pub mod datagov;
pub mod fallback;
pub mod openweather;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use agrocast_core::{CurrentWeather, PriceRecord, PriceState, WeatherReading};

pub use datagov::DataGovPriceFeed;
pub use fallback::{fallback_prices, fallback_weather, FallbackPriceFeed, FallbackWeatherFeed};
pub use openweather::OpenWeatherFeed;

/// Transport-level failures inside a live feed.
///
/// These never reach forecast callers; they are logged and replaced by the
/// fallback payload.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("environment variable {var} is not set")]
    MissingApiKey { var: &'static str },

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for '{subject}'")]
    Status { status: u16, subject: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("no records for '{subject}'")]
    NoRecords { subject: String },
}

/// Whether a payload came from the live source or the fallback table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Live,
    Fallback,
}

/// Current price plus whatever history the source offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservations {
    pub crop: String,
    pub current_price: f64,
    /// Most recent observed change, percent.
    pub change_pct: f64,
    /// Macro trend implied by `change_pct`.
    pub trend: PriceState,
    /// Chronological (oldest first). Empty for fallback payloads.
    pub history: Vec<PriceRecord>,
    pub market: String,
    pub source: SourceTag,
    pub source_name: String,
}

/// Current conditions plus whatever history the source offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservations {
    pub location: String,
    /// City name as reported by the source.
    pub city: String,
    pub current: CurrentWeather,
    /// Chronological. Empty when the source has no history.
    pub history: Vec<WeatherReading>,
    pub source: SourceTag,
    pub source_name: String,
}

/// Source of crop price observations.
pub trait PriceFeed: Send + Sync {
    fn name(&self) -> &str;

    /// Current and historical prices for `crop`, live or fallback.
    fn fetch_prices(&self, crop: &str) -> PriceObservations;
}

/// Source of weather observations.
pub trait WeatherFeed: Send + Sync {
    fn name(&self) -> &str;

    /// Current conditions (and history, if any) for `location`.
    fn fetch_weather(&self, location: &str) -> WeatherObservations;
}

/// Shared blocking client with the feed timeout applied.
pub(crate) fn http_client() -> Result<reqwest::blocking::Client, FeedError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| FeedError::Client(e.to_string()))
}

/// Map a reqwest send error onto the feed taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> FeedError {
    FeedError::NetworkUnreachable(e.to_string())
}

/// Read an API key from the environment.
pub(crate) fn api_key_from_env(var: &'static str) -> Result<String, FeedError> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(FeedError::MissingApiKey { var }),
    }
}
