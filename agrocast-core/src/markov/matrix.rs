//! Row-stochastic transition matrix over a closed alphabet.

use rand::Rng;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::marker::PhantomData;
use thiserror::Error;

use crate::domain::MarkovState;

/// Allowed deviation of a row sum from 1.
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Labeled form used for payloads and config tables: `from -> to -> p`.
pub type LabeledMatrix = BTreeMap<String, BTreeMap<String, f64>>;

/// Errors from building a matrix out of an explicit table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("expected {expected} rows, got {got}")]
    RowCount { expected: usize, got: usize },

    #[error("row '{state}' has {got} entries, expected {expected}")]
    RowWidth {
        state: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("row '{state}' holds a negative or non-finite probability")]
    InvalidProbability { state: &'static str },

    #[error("row '{state}' sums to {sum}, not 1")]
    RowSum { state: &'static str, sum: f64 },

    #[error("unknown state '{0}' in matrix table")]
    UnknownState(String),

    #[error("matrix table has no row for '{0}'")]
    MissingRow(&'static str),
}

/// `rows[from.index()][to.index()]` is P(next = to | current = from).
///
/// Every row is non-negative and sums to 1 within [`ROW_SUM_TOLERANCE`].
/// Matrices are built per forecast and never shared between requests.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix<S: MarkovState> {
    rows: Vec<Vec<f64>>,
    _alphabet: PhantomData<S>,
}

impl<S: MarkovState> TransitionMatrix<S> {
    /// Every transition equally likely.
    pub fn uniform() -> Self {
        let n = S::alphabet_size();
        Self {
            rows: vec![uniform_row(n); n],
            _alphabet: PhantomData,
        }
    }

    /// Validate and adopt explicit rows in alphabet order.
    ///
    /// Rows within tolerance are rescaled so they sum to 1 exactly.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let n = S::alphabet_size();
        if rows.len() != n {
            return Err(MatrixError::RowCount {
                expected: n,
                got: rows.len(),
            });
        }
        let mut rows = rows;
        for (state, row) in S::ALPHABET.iter().zip(rows.iter_mut()) {
            let label = state.label();
            if row.len() != n {
                return Err(MatrixError::RowWidth {
                    state: label,
                    expected: n,
                    got: row.len(),
                });
            }
            if row.iter().any(|p| !p.is_finite() || *p < 0.0) {
                return Err(MatrixError::InvalidProbability { state: label });
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(MatrixError::RowSum { state: label, sum });
            }
            row.iter_mut().for_each(|p| *p /= sum);
        }
        Ok(Self {
            rows,
            _alphabet: PhantomData,
        })
    }

    /// Build from a labeled table. Targets missing from a row count as 0.
    pub fn from_labeled(table: &LabeledMatrix) -> Result<Self, MatrixError> {
        let n = S::alphabet_size();
        let mut rows = vec![vec![0.0; n]; n];
        let mut seen = vec![false; n];
        for (from_label, targets) in table {
            let from = S::from_label(from_label)
                .ok_or_else(|| MatrixError::UnknownState(from_label.clone()))?;
            seen[from.index()] = true;
            for (to_label, &p) in targets {
                let to = S::from_label(to_label)
                    .ok_or_else(|| MatrixError::UnknownState(to_label.clone()))?;
                rows[from.index()][to.index()] = p;
            }
        }
        if let Some(missing) = seen.iter().position(|s| !s) {
            return Err(MatrixError::MissingRow(S::ALPHABET[missing].label()));
        }
        Self::from_rows(rows)
    }

    /// Adopt rows already known to be stochastic (built-in tables and
    /// normalized estimates).
    pub(crate) fn from_rows_unchecked(rows: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(rows.len(), S::alphabet_size());
        Self {
            rows,
            _alphabet: PhantomData,
        }
    }

    pub fn prob(&self, from: S, to: S) -> f64 {
        self.rows[from.index()][to.index()]
    }

    pub fn row(&self, from: S) -> &[f64] {
        &self.rows[from.index()]
    }

    /// Draw the next state from the categorical distribution `row(from)`.
    ///
    /// Consumes exactly one `f64` from `rng` per call.
    pub fn sample<R: Rng + ?Sized>(&self, from: S, rng: &mut R) -> S {
        let row = self.row(from);
        let u: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (i, p) in row.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return S::ALPHABET[i];
            }
        }
        // Rounding left `u` past the final cumulative sum: take the last
        // reachable state.
        let last = row.iter().rposition(|p| *p > 0.0).unwrap_or(row.len() - 1);
        S::ALPHABET[last]
    }

    /// True when every row is non-negative and sums to 1 within tolerance.
    pub fn is_row_stochastic(&self) -> bool {
        self.rows.iter().all(|row| {
            row.iter().all(|p| p.is_finite() && *p >= 0.0)
                && (row.iter().sum::<f64>() - 1.0).abs() <= ROW_SUM_TOLERANCE
        })
    }

    pub fn to_labeled(&self) -> LabeledMatrix {
        S::ALPHABET
            .iter()
            .map(|from| {
                let targets = S::ALPHABET
                    .iter()
                    .map(|to| (to.label().to_string(), self.prob(*from, *to)))
                    .collect();
                (from.label().to_string(), targets)
            })
            .collect()
    }
}

impl<S: MarkovState> Serialize for TransitionMatrix<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.to_labeled().serialize(serializer)
    }
}

impl<'de, S: MarkovState> Deserialize<'de> for TransitionMatrix<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let table = LabeledMatrix::deserialize(deserializer)?;
        Self::from_labeled(&table).map_err(de::Error::custom)
    }
}

pub(crate) fn uniform_row(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

/// Rescale `row` in place to sum to 1. Returns `false` (row untouched) when
/// the sum is zero or not finite.
pub fn normalize_row(row: &mut [f64]) -> bool {
    let sum: f64 = row.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        return false;
    }
    row.iter_mut().for_each(|p| *p /= sum);
    true
}
