//! Deterministic fallback payloads, used whenever a live source is
//! unavailable.

use agrocast_core::{CurrentWeather, MarkovState, PriceState, WeatherState};

use super::{PriceFeed, PriceObservations, SourceTag, WeatherFeed, WeatherObservations};

pub const FALLBACK_SOURCE_NAME: &str = "Fallback Data";

/// Market reported when the source has none.
pub const NATIONAL_AVERAGE: &str = "National Average";

/// `(crop, price, trend, recent change %)`.
const CROP_QUOTES: &[(&str, f64, PriceState, f64)] = &[
    ("wheat", 28.5, PriceState::Increase, 1.2),
    ("rice", 42.3, PriceState::Stable, 0.3),
    ("cotton", 68.7, PriceState::Decrease, -2.1),
    ("sugarcane", 3.8, PriceState::Increase, 0.2),
    ("groundnut", 58.9, PriceState::Increase, 3.4),
    ("maize", 22.1, PriceState::Stable, 0.1),
    ("paddy", 19.5, PriceState::Decrease, -0.8),
    ("pulses", 85.2, PriceState::Increase, 4.7),
];

const DEFAULT_QUOTE: (f64, PriceState, f64) = (30.0, PriceState::Stable, 0.0);

/// `(city, temperature C, humidity %, state, wind km/h)`.
const CITY_CONDITIONS: &[(&str, f64, f64, WeatherState, f64)] = &[
    ("delhi", 32.5, 45.0, WeatherState::Sunny, 12.0),
    ("mumbai", 29.8, 78.0, WeatherState::Cloudy, 18.0),
    ("chennai", 34.2, 65.0, WeatherState::Sunny, 15.0),
    ("kolkata", 31.7, 72.0, WeatherState::Rainy, 20.0),
    ("bangalore", 27.3, 58.0, WeatherState::Sunny, 10.0),
];

const DEFAULT_CONDITIONS: (f64, f64, WeatherState, f64) = (30.0, 60.0, WeatherState::Sunny, 15.0);

/// Lookup key for a location: lowercased first comma-separated token, so
/// "Mumbai, IN" and "mumbai" match.
pub fn location_key(location: &str) -> String {
    location
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Fallback quote for `crop` (case-insensitive). Unknown crops get a flat
/// 30.0 with no trend.
pub fn fallback_prices(crop: &str) -> PriceObservations {
    let key = crop.trim().to_lowercase();
    let (price, trend, change_pct) = CROP_QUOTES
        .iter()
        .find(|(name, ..)| *name == key)
        .map_or(DEFAULT_QUOTE, |&(_, p, t, c)| (p, t, c));
    PriceObservations {
        crop: crop.to_string(),
        current_price: price,
        change_pct,
        trend,
        history: Vec::new(),
        market: NATIONAL_AVERAGE.to_string(),
        source: SourceTag::Fallback,
        source_name: FALLBACK_SOURCE_NAME.to_string(),
    }
}

/// Fallback conditions for `location`. Unknown locations get 30 C, 60 %,
/// sunny, 15 km/h.
pub fn fallback_weather(location: &str) -> WeatherObservations {
    let key = location_key(location);
    let (temperature, humidity, state, wind_speed) = CITY_CONDITIONS
        .iter()
        .find(|(city, ..)| *city == key)
        .map_or(DEFAULT_CONDITIONS, |&(_, t, h, s, w)| (t, h, s, w));
    WeatherObservations {
        location: location.to_string(),
        city: location.to_string(),
        current: CurrentWeather {
            state,
            temperature,
            humidity,
            wind_speed,
            description: state.label().to_lowercase(),
        },
        history: Vec::new(),
        source: SourceTag::Fallback,
        source_name: FALLBACK_SOURCE_NAME.to_string(),
    }
}

/// Price feed that always serves the fallback table. Used offline and in
/// tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackPriceFeed;

impl PriceFeed for FallbackPriceFeed {
    fn name(&self) -> &str {
        "fallback"
    }

    fn fetch_prices(&self, crop: &str) -> PriceObservations {
        fallback_prices(crop)
    }
}

/// Weather feed that always serves the fallback table.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackWeatherFeed;

impl WeatherFeed for FallbackWeatherFeed {
    fn name(&self) -> &str {
        "fallback"
    }

    fn fetch_weather(&self, location: &str) -> WeatherObservations {
        fallback_weather(location)
    }
}
