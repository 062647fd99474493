//! Observation records handed to the engine by collaborators.
//!
//! All of these are request-scoped: built when a forecast starts and
//! dropped with it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::state::WeatherState;

/// One dated commodity price quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub price: f64,
}

/// One historical day of weather, already classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub date: NaiveDate,
    pub state: WeatherState,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// km/h.
    pub wind_speed: f64,
    /// mm over the day.
    pub rainfall: f64,
}

/// Current conditions at a location; the day-0 anchor of a weather forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub state: WeatherState,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub description: String,
}
