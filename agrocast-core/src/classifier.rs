//! Raw observation to discrete state.
//!
//! Price moves are bucketed by percent change against a fixed band; weather
//! conditions are looked up in the vendor vocabulary table below.

use tracing::debug;

use crate::domain::{PriceState, WeatherState};

/// Half-width of the "no meaningful move" band, in percent.
///
/// The band is closed: a change of exactly +2.0 or -2.0 is `Stable`.
pub const PRICE_CHANGE_BAND_PCT: f64 = 2.0;

/// Vendor condition names mapped onto the weather alphabet.
pub const WEATHER_CONDITIONS: &[(&str, WeatherState)] = &[
    ("Clear", WeatherState::Sunny),
    ("Clouds", WeatherState::Cloudy),
    ("Rain", WeatherState::Rainy),
    ("Drizzle", WeatherState::Rainy),
    ("Thunderstorm", WeatherState::Storm),
    ("Snow", WeatherState::Rainy),
    ("Mist", WeatherState::Cloudy),
    ("Fog", WeatherState::Cloudy),
    ("Haze", WeatherState::Cloudy),
];

/// State assigned to any condition name missing from `WEATHER_CONDITIONS`.
pub const UNMAPPED_WEATHER_STATE: WeatherState = WeatherState::Sunny;

/// Bucket a percent change: `> 2.0` rises, `< -2.0` falls, everything else
/// (including NaN) is stable.
pub fn classify_price_state(percent_change: f64) -> PriceState {
    if percent_change > PRICE_CHANGE_BAND_PCT {
        PriceState::Increase
    } else if percent_change < -PRICE_CHANGE_BAND_PCT {
        PriceState::Decrease
    } else {
        PriceState::Stable
    }
}

/// Percent change from `from` to `to`, or `None` when `from` is not a
/// usable positive price.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from.is_finite() && from > 0.0 && to.is_finite() {
        Some((to - from) / from * 100.0)
    } else {
        None
    }
}

/// Keep only finite, strictly positive prices, preserving order.
pub fn usable_prices(prices: &[f64]) -> Vec<f64> {
    prices
        .iter()
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect()
}

/// Classify every consecutive move in a chronological price series.
///
/// Unusable prices are dropped first, so `n` usable prices yield `n - 1`
/// states.
pub fn classify_price_series(prices: &[f64]) -> Vec<PriceState> {
    usable_prices(prices)
        .windows(2)
        .filter_map(|w| percent_change(w[0], w[1]))
        .map(classify_price_state)
        .collect()
}

/// Map a vendor condition name (e.g. "Thunderstorm") onto the alphabet.
///
/// Matching ignores case and surrounding whitespace. Unmapped names fall
/// back to [`UNMAPPED_WEATHER_STATE`].
pub fn classify_weather_state(raw_condition: &str) -> WeatherState {
    let needle = raw_condition.trim();
    match WEATHER_CONDITIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(needle))
    {
        Some((_, state)) => *state,
        None => {
            debug!(
                condition = raw_condition,
                fallback = %UNMAPPED_WEATHER_STATE,
                "unmapped weather condition"
            );
            UNMAPPED_WEATHER_STATE
        }
    }
}
