//! OpenWeather current-conditions feed.
//!
//! The API offers no history on this endpoint, so observations from this feed
//! always carry an empty history and the orchestrator synthesizes one.

use serde::Deserialize;
use tracing::{info, warn};

use agrocast_core::simulate::round_to;
use agrocast_core::{classify_weather_state, CurrentWeather};

use super::fallback::fallback_weather;
use super::{
    api_key_from_env, http_client, transport_error, FeedError, SourceTag, WeatherFeed,
    WeatherObservations,
};

pub const OPENWEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const OPENWEATHER_KEY_VAR: &str = "WEATHER_API_KEY";
pub const OPENWEATHER_SOURCE_NAME: &str = "OpenWeather API";

const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    main: MainBlock,
    wind: WindBlock,
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    main: String,
    #[serde(default)]
    description: String,
}

/// Parse a current-conditions body for `location`.
pub fn parse_response(location: &str, body: &str) -> Result<WeatherObservations, FeedError> {
    let resp: CurrentResponse = serde_json::from_str(body).map_err(|e| {
        FeedError::ResponseFormatChanged(format!("current weather for {location}: {e}"))
    })?;
    let condition = resp.weather.first().ok_or_else(|| {
        FeedError::ResponseFormatChanged(format!("no condition block for {location}"))
    })?;

    let state = classify_weather_state(&condition.main);
    let description = if condition.description.is_empty() {
        condition.main.to_lowercase()
    } else {
        condition.description.clone()
    };

    Ok(WeatherObservations {
        location: location.to_string(),
        city: resp
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| location.to_string()),
        current: CurrentWeather {
            state,
            temperature: round_to(resp.main.temp, 1),
            humidity: resp.main.humidity,
            wind_speed: round_to(resp.wind.speed * MPS_TO_KMH, 1),
            description,
        },
        history: Vec::new(),
        source: SourceTag::Live,
        source_name: OPENWEATHER_SOURCE_NAME.to_string(),
    })
}

/// Live weather feed backed by OpenWeather.
pub struct OpenWeatherFeed {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl OpenWeatherFeed {
    pub fn new(api_key: impl Into<String>) -> Result<Self, FeedError> {
        Ok(Self {
            client: http_client()?,
            api_key: api_key.into(),
            endpoint: OPENWEATHER_ENDPOINT.to_string(),
        })
    }

    /// Build from `WEATHER_API_KEY`.
    pub fn from_env() -> Result<Self, FeedError> {
        Self::new(api_key_from_env(OPENWEATHER_KEY_VAR)?)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn try_fetch(&self, location: &str) -> Result<WeatherObservations, FeedError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                subject: location.to_string(),
            });
        }
        let body = resp.text().map_err(transport_error)?;
        parse_response(location, &body)
    }
}

impl WeatherFeed for OpenWeatherFeed {
    fn name(&self) -> &str {
        OPENWEATHER_SOURCE_NAME
    }

    fn fetch_weather(&self, location: &str) -> WeatherObservations {
        match self.try_fetch(location) {
            Ok(obs) => {
                info!(location, state = %obs.current.state, "live weather fetched");
                obs
            }
            Err(e) => {
                warn!(location, error = %e, "weather feed failed, using fallback");
                fallback_weather(location)
            }
        }
    }
}
