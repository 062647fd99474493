//! Forecast configuration loaded from TOML.
//!
//! Every table carries a documented `Default`, so an empty file (or no file
//! at all) yields the stock behaviour. Partial files override only the keys
//! they name.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use agrocast_core::simulate::{Band, ClimatologyJitter, PricePerturbation, WeatherProfiles};
use agrocast_core::{
    AlertThresholds, MarkovState, PriceMatrixDefaults, TransitionMatrix, VolatilityEstimator,
};

/// Errors from loading or validating a [`ForecastConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Horizon normalisation for incoming requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonPolicy {
    /// Substituted for a missing or non-positive horizon.
    pub default: usize,
    /// Longer requests are clamped to this.
    pub max: usize,
}

impl Default for HorizonPolicy {
    fn default() -> Self {
        Self { default: 3, max: 10 }
    }
}

impl HorizonPolicy {
    /// Map a requested horizon onto `1..=max`.
    ///
    /// `<= 0` becomes `default`; anything above `max` becomes `max`.
    pub fn resolve(&self, requested: i64) -> usize {
        if requested <= 0 {
            return self.default.min(self.max);
        }
        usize::try_from(requested).map_or(self.max, |h| h.min(self.max))
    }
}

/// Price-domain tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub smoothing_alpha: f64,
    pub volatility: VolatilityEstimator,
    /// History shorter than this skips estimation and uses the trend matrix.
    pub min_history: usize,
    pub perturbation: PricePerturbation,
    pub matrices: PriceMatrixDefaults,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.1,
            volatility: VolatilityEstimator::default(),
            min_history: 3,
            perturbation: PricePerturbation::default(),
            matrices: PriceMatrixDefaults::default(),
        }
    }
}

/// Weather-domain tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub smoothing_alpha: f64,
    /// Days of history to synthesize when the feed supplies none.
    pub history_days: usize,
    pub profiles: WeatherProfiles,
    pub jitter: ClimatologyJitter,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.1,
            history_days: 90,
            profiles: WeatherProfiles::default(),
            jitter: ClimatologyJitter::default(),
        }
    }
}

/// Complete orchestrator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub horizon: HorizonPolicy,
    pub price: PriceConfig,
    pub weather: WeatherConfig,
    pub alerts: AlertThresholds,
    /// Master seed for reproducible runs. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl ForecastConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tables the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.horizon;
        if h.max == 0 {
            return invalid("horizon.max must be at least 1");
        }
        if h.default == 0 || h.default > h.max {
            return invalid(format!(
                "horizon.default ({}) must lie in 1..={}",
                h.default, h.max
            ));
        }

        let p = &self.price;
        check_alpha("price.smoothing_alpha", p.smoothing_alpha)?;
        let v = &p.volatility;
        if !(v.min_vol.is_finite() && v.max_vol.is_finite() && v.default_vol.is_finite()) {
            return invalid("price.volatility bounds must be finite");
        }
        if v.min_vol < 0.0 || v.min_vol > v.max_vol {
            return invalid(format!(
                "price.volatility needs 0 <= min_vol <= max_vol, got [{}, {}]",
                v.min_vol, v.max_vol
            ));
        }
        check_band("price.perturbation.increase", &p.perturbation.increase)?;
        check_band("price.perturbation.decrease", &p.perturbation.decrease)?;
        check_band("price.perturbation.stable", &p.perturbation.stable)?;
        let m = &p.matrices;
        check_matrix("price.matrices.sparse_rows", &m.sparse_rows)?;
        check_matrix("price.matrices.rising", &m.rising)?;
        check_matrix("price.matrices.falling", &m.falling)?;
        check_matrix("price.matrices.steady", &m.steady)?;

        let w = &self.weather;
        check_alpha("weather.smoothing_alpha", w.smoothing_alpha)?;
        if w.history_days < 2 {
            return invalid("weather.history_days must be at least 2");
        }
        for (state, profile) in w.profiles.iter() {
            let name = state.label().to_lowercase();
            let bands = [
                ("temperature_offset", &profile.temperature_offset),
                ("humidity_offset", &profile.humidity_offset),
                ("humidity_bounds", &profile.humidity_bounds),
                ("wind_speed", &profile.wind_speed),
                ("rainfall", &profile.rainfall),
            ];
            for (field, band) in bands {
                check_band(&format!("weather.profiles.{name}.{field}"), band)?;
            }
        }
        check_band("weather.jitter.humidity_bounds", &w.jitter.humidity_bounds)?;

        let a = &self.alerts;
        if !(a.heavy_rain_mm.is_finite() && a.heat_c.is_finite() && a.cold_c.is_finite()) {
            return invalid("alerts thresholds must be finite");
        }
        if a.cold_c > a.heat_c {
            return invalid(format!(
                "alerts.cold_c ({}) is above alerts.heat_c ({})",
                a.cold_c, a.heat_c
            ));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(msg.into()))
}

fn check_alpha(name: &str, alpha: f64) -> Result<(), ConfigError> {
    if alpha.is_finite() && alpha >= 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be finite and non-negative, got {alpha}"))
    }
}

fn check_band(name: &str, band: &Band) -> Result<(), ConfigError> {
    if band.is_ordered() {
        Ok(())
    } else {
        invalid(format!("{name} is inverted: [{}, {}]", band.lo, band.hi))
    }
}

fn check_matrix<S: MarkovState>(name: &str, m: &TransitionMatrix<S>) -> Result<(), ConfigError> {
    if m.is_row_stochastic() {
        Ok(())
    } else {
        invalid(format!("{name} has a row that does not sum to 1"))
    }
}
