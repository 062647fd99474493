//! Forecast payloads.
//!
//! Field names are the downstream contract; they serialize as-is to JSON.

use chrono::NaiveDate;
use serde::Serialize;

use agrocast_core::{
    Alert, CurrentWeather, Level, PriceState, PriceStep, TransitionMatrix, TrendLabel,
    WeatherState,
};

use crate::provider::SourceTag;

/// How the price matrix was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixBasis {
    /// Estimated from classified price history.
    Empirical,
    /// History too short; the trend-conditioned default table was used.
    TrendDefault,
    /// Enough records, but no usable price moves; the sparse default table
    /// was used whole.
    SparseDefault,
}

/// Where the weather history behind the matrix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    Observed,
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceForecast {
    pub crop: String,
    pub as_of: NaiveDate,
    pub current_price: f64,
    /// State of the most recent observed change.
    pub current_state: PriceState,
    /// Macro trend reported by the source.
    pub market_trend: PriceState,
    pub recent_change_percent: f64,
    pub forecast_steps: usize,
    pub predicted_trends: Vec<PriceState>,
    pub predicted_prices: Vec<f64>,
    /// Start state followed by every simulated state.
    pub state_sequence: Vec<PriceState>,
    pub steps: Vec<PriceStep>,
    pub overall_trend: TrendLabel,
    pub price_change_percent: f64,
    pub total_price_change: f64,
    pub recommendation: String,
    pub confidence: Level,
    /// Percent, two decimals.
    pub volatility: f64,
    pub transition_matrix: TransitionMatrix<PriceState>,
    pub matrix_quality: Level,
    pub matrix_basis: MatrixBasis,
    pub historical_records_used: usize,
    pub data_source: SourceTag,
    pub source_name: String,
    pub market: String,
}

/// One row of the detailed weather forecast; day 0 is the observed anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub day: usize,
    pub weather: WeatherState,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall_mm: f64,
    pub wind_speed: f64,
    pub is_current: bool,
    pub description: String,
    pub markov_probability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_from: Option<WeatherState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSummary {
    pub current_temperature: f64,
    pub current_humidity: f64,
    pub avg_forecast_temperature: f64,
    pub total_rainfall: f64,
    pub rainy_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherForecast {
    pub location: String,
    pub city: String,
    pub as_of: NaiveDate,
    pub current_weather: CurrentWeather,
    pub forecast: Vec<WeatherState>,
    pub detailed_forecast: Vec<ForecastDay>,
    pub alerts: Vec<Alert>,
    pub transition_matrix: TransitionMatrix<WeatherState>,
    pub matrix_quality: Level,
    pub historical_data_points: usize,
    pub history_source: HistorySource,
    pub summary: WeatherSummary,
    pub risk_level: Level,
    pub farming_suggestions: Vec<String>,
    pub data_source: SourceTag,
    pub source_name: String,
}

impl PriceForecast {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl WeatherForecast {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Simulated days only, without the day-0 anchor.
    pub fn simulated_days(&self) -> &[ForecastDay] {
        self.detailed_forecast.get(1..).unwrap_or_default()
    }
}
