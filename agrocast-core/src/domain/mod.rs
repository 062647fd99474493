//! Domain types for agrocast

pub mod level;
pub mod reading;
pub mod state;

pub use level::Level;
pub use reading::{CurrentWeather, PriceRecord, WeatherReading};
pub use state::{MarkovState, PriceState, UnknownState, WeatherState};
