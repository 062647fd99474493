//! Bounded dispersion of simple returns.
//!
//! The estimate scales simulated price perturbations, so it is clamped to a
//! sane band and never fails: missing or degenerate history yields the
//! documented default instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::usable_prices;

/// Clamp band and default for return volatility (fractions, not percent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityEstimator {
    pub min_vol: f64,
    pub max_vol: f64,
    /// Used when fewer than two usable prices exist.
    pub default_vol: f64,
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self {
            min_vol: 0.05,
            max_vol: 0.30,
            default_vol: 0.10,
        }
    }
}

impl VolatilityEstimator {
    pub fn new(min_vol: f64, max_vol: f64, default_vol: f64) -> Self {
        Self {
            min_vol,
            max_vol,
            default_vol,
        }
    }

    /// Sample standard deviation of simple returns over the usable
    /// (finite, positive) prices, clamped to `[min_vol, max_vol]`.
    ///
    /// The result always lies inside the band, including the default path.
    pub fn estimate(&self, prices: &[f64]) -> f64 {
        let prices = usable_prices(prices);
        if prices.len() < 2 {
            debug!(
                usable = prices.len(),
                default = self.default_vol,
                "not enough prices for volatility, using default"
            );
            return self.clamp(self.default_vol);
        }
        let returns = simple_returns(&prices);
        self.clamp(sample_std(&returns))
    }

    fn clamp(&self, value: f64) -> f64 {
        let lo = self.min_vol.min(self.max_vol);
        let hi = self.min_vol.max(self.max_vol);
        if value.is_nan() {
            return lo;
        }
        value.clamp(lo, hi)
    }
}

/// Free-function form with the default fallback value.
pub fn estimate_volatility(prices: &[f64], min_vol: f64, max_vol: f64) -> f64 {
    VolatilityEstimator {
        min_vol,
        max_vol,
        ..VolatilityEstimator::default()
    }
    .estimate(prices)
}

/// `r_i = (p_i - p_{i-1}) / p_{i-1}` for each consecutive pair with a
/// positive base.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Sample standard deviation (n - 1 denominator). Fewer than two values
/// carry no dispersion and return 0.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}
