//! Named fallback matrices per domain.
//!
//! The price and weather domains deliberately default differently when data
//! is sparse: price rows lean toward `Stable` with a mild persistence bias,
//! weather rows are uniform.

use serde::{Deserialize, Serialize};

use super::matrix::TransitionMatrix;
use crate::domain::{PriceState, WeatherState};

/// Price fallbacks. Rows are in alphabet order `Increase, Decrease, Stable`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceMatrixDefaults {
    /// Rows substituted for source states with no observed transitions,
    /// and the whole matrix when fewer than two states were observed.
    pub sparse_rows: TransitionMatrix<PriceState>,
    /// Used instead of estimation when history is too short and the market
    /// trend is rising.
    pub rising: TransitionMatrix<PriceState>,
    /// Same, market trend falling.
    pub falling: TransitionMatrix<PriceState>,
    /// Same, market trend flat.
    pub steady: TransitionMatrix<PriceState>,
}

impl PriceMatrixDefaults {
    /// Trend-conditioned matrix used when history is too short to estimate.
    pub fn for_trend(&self, trend: PriceState) -> &TransitionMatrix<PriceState> {
        match trend {
            PriceState::Increase => &self.rising,
            PriceState::Decrease => &self.falling,
            PriceState::Stable => &self.steady,
        }
    }
}

impl Default for PriceMatrixDefaults {
    fn default() -> Self {
        Self {
            sparse_rows: TransitionMatrix::from_rows_unchecked(vec![
                vec![0.4, 0.2, 0.4],
                vec![0.2, 0.4, 0.4],
                vec![0.3, 0.3, 0.4],
            ]),
            rising: TransitionMatrix::from_rows_unchecked(vec![
                vec![0.6, 0.15, 0.25],
                vec![0.4, 0.25, 0.35],
                vec![0.5, 0.2, 0.3],
            ]),
            falling: TransitionMatrix::from_rows_unchecked(vec![
                vec![0.3, 0.3, 0.4],
                vec![0.2, 0.5, 0.3],
                vec![0.25, 0.4, 0.35],
            ]),
            steady: TransitionMatrix::from_rows_unchecked(vec![
                vec![0.4, 0.2, 0.4],
                vec![0.3, 0.3, 0.4],
                vec![0.35, 0.25, 0.4],
            ]),
        }
    }
}

/// Weather fallback: any source state without observations moves uniformly.
pub fn weather_sparse_rows() -> TransitionMatrix<WeatherState> {
    TransitionMatrix::uniform()
}
