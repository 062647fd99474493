//! Empirical transition estimation with additive smoothing.

use tracing::debug;

use super::matrix::{normalize_row, TransitionMatrix};
use crate::domain::{Level, MarkovState};

/// A built matrix plus how much data backed it.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatedMatrix<S: MarkovState> {
    pub matrix: TransitionMatrix<S>,
    pub quality: Level,
    /// Adjacent pairs counted.
    pub transitions: usize,
    /// Source states whose row came from the fallback table.
    pub defaulted_rows: Vec<S>,
}

/// Counts adjacent state pairs and turns them into probabilities:
///
/// `p(to | from) = (count + alpha) / (total + alpha * |alphabet|)`
///
/// Source states never seen as the left half of a pair take their row from
/// `fallback`. Fewer than two states skips estimation and returns `fallback`
/// whole with `Level::Low`. Building never fails.
#[derive(Debug, Clone)]
pub struct TransitionMatrixBuilder<S: MarkovState> {
    alpha: f64,
    fallback: TransitionMatrix<S>,
}

impl<S: MarkovState> TransitionMatrixBuilder<S> {
    /// A negative or non-finite `alpha` is treated as 0 (no smoothing).
    pub fn new(alpha: f64, fallback: TransitionMatrix<S>) -> Self {
        let alpha = if alpha.is_finite() && alpha > 0.0 {
            alpha
        } else {
            0.0
        };
        Self { alpha, fallback }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn build(&self, states: &[S]) -> EstimatedMatrix<S> {
        if states.len() < 2 {
            debug!(
                observations = states.len(),
                "too few states to estimate transitions, using fallback matrix"
            );
            return EstimatedMatrix {
                matrix: self.fallback.clone(),
                quality: Level::Low,
                transitions: 0,
                defaulted_rows: S::ALPHABET.to_vec(),
            };
        }

        let n = S::alphabet_size();
        let mut counts = vec![vec![0usize; n]; n];
        for pair in states.windows(2) {
            counts[pair[0].index()][pair[1].index()] += 1;
        }

        let mut rows = Vec::with_capacity(n);
        let mut defaulted_rows = Vec::new();
        for (from, row_counts) in S::ALPHABET.iter().zip(&counts) {
            let total: usize = row_counts.iter().sum();
            if total == 0 {
                defaulted_rows.push(*from);
                rows.push(self.fallback.row(*from).to_vec());
                continue;
            }
            let denom = total as f64 + self.alpha * n as f64;
            let mut row: Vec<f64> = row_counts
                .iter()
                .map(|c| (*c as f64 + self.alpha) / denom)
                .collect();
            if !normalize_row(&mut row) {
                defaulted_rows.push(*from);
                row = self.fallback.row(*from).to_vec();
            }
            rows.push(row);
        }

        if !defaulted_rows.is_empty() {
            debug!(
                rows = ?defaulted_rows,
                "no observed transitions out of some states, using fallback rows"
            );
        }

        EstimatedMatrix {
            matrix: TransitionMatrix::from_rows_unchecked(rows),
            quality: Level::from_observation_count(states.len()),
            transitions: states.len() - 1,
            defaulted_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify_price_series;
    use crate::domain::{PriceState, WeatherState};
    use crate::markov::defaults::{weather_sparse_rows, PriceMatrixDefaults};

    fn price_builder(alpha: f64) -> TransitionMatrixBuilder<PriceState> {
        TransitionMatrixBuilder::new(alpha, PriceMatrixDefaults::default().sparse_rows)
    }

    #[test]
    fn empty_and_single_fall_back_whole() {
        let b = price_builder(0.1);
        for states in [vec![], vec![PriceState::Increase]] {
            let est = b.build(&states);
            assert_eq!(est.quality, Level::Low);
            assert_eq!(est.transitions, 0);
            assert_eq!(est.matrix, PriceMatrixDefaults::default().sparse_rows);
            assert_eq!(est.defaulted_rows.len(), 3);
        }
    }

    #[test]
    fn observed_pairs_dominate_smoothing_mass() {
        // 100 -> 102 -> 101 -> 105 classifies to Stable, Stable, Increase.
        let states = classify_price_series(&[100.0, 102.0, 101.0, 105.0]);
        let est = price_builder(0.1).build(&states);
        let m = &est.matrix;

        assert!(m.is_row_stochastic());
        // Stable row saw Stable->Stable and Stable->Increase once each.
        let observed_ss = m.prob(PriceState::Stable, PriceState::Stable);
        let observed_si = m.prob(PriceState::Stable, PriceState::Increase);
        let smoothed_sd = m.prob(PriceState::Stable, PriceState::Decrease);
        assert!(smoothed_sd > 0.0);
        assert!(observed_ss > smoothed_sd);
        assert!(observed_si > smoothed_sd);
        assert!((observed_ss - 1.1 / 2.3).abs() < 1e-12);
        assert!((smoothed_sd - 0.1 / 2.3).abs() < 1e-12);

        // Increase and Decrease were never a source state.
        assert_eq!(
            est.defaulted_rows,
            vec![PriceState::Increase, PriceState::Decrease]
        );
        assert_eq!(
            m.row(PriceState::Increase),
            PriceMatrixDefaults::default().sparse_rows.row(PriceState::Increase)
        );
        assert_eq!(est.quality, Level::Medium);
    }

    #[test]
    fn zero_alpha_gives_raw_frequencies() {
        use PriceState::*;
        let est = price_builder(0.0).build(&[Stable, Increase, Stable, Stable]);
        assert_eq!(est.matrix.prob(Stable, Increase), 0.5);
        assert_eq!(est.matrix.prob(Stable, Stable), 0.5);
        assert_eq!(est.matrix.prob(Stable, Decrease), 0.0);
        assert_eq!(est.matrix.prob(Increase, Stable), 1.0);
    }

    #[test]
    fn weather_rows_fall_back_uniform() {
        use WeatherState::*;
        let b = TransitionMatrixBuilder::new(0.1, weather_sparse_rows());
        let est = b.build(&[Sunny, Sunny, Cloudy, Sunny, Cloudy, Cloudy]);
        assert_eq!(est.quality, Level::High);
        assert_eq!(est.matrix.row(Storm), &[0.25, 0.25, 0.25, 0.25]);
        assert_eq!(est.matrix.row(Rainy), &[0.25, 0.25, 0.25, 0.25]);
        assert!(est.matrix.is_row_stochastic());
    }

    #[test]
    fn invalid_alpha_means_no_smoothing() {
        assert_eq!(price_builder(-1.0).alpha(), 0.0);
        assert_eq!(price_builder(f64::NAN).alpha(), 0.0);
    }
}
