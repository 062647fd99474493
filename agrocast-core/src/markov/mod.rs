//! Markov transition matrices: representation, estimation, and fallbacks.

pub mod builder;
pub mod defaults;
pub mod matrix;

pub use builder::{EstimatedMatrix, TransitionMatrixBuilder};
pub use defaults::{weather_sparse_rows, PriceMatrixDefaults};
pub use matrix::{normalize_row, LabeledMatrix, MatrixError, TransitionMatrix, ROW_SUM_TOLERANCE};
