//! Agrocast Core: the stochastic forecasting engine.
//!
//! This crate turns a time-ordered sequence of observations into:
//! - a discrete state per observation (price move or weather condition)
//! - an empirically estimated, smoothed Markov transition matrix
//! - a bounded volatility estimate for price perturbations
//! - a multi-step simulated trajectory driven by an injected RNG
//! - threshold alerts and a trend outlook derived from the trajectory
//!
//! Nothing here performs I/O or keeps state between calls.

pub mod alerts;
pub mod classifier;
pub mod domain;
pub mod markov;
pub mod rng;
pub mod simulate;
pub mod trend;
pub mod volatility;

pub use alerts::{Alert, AlertEngine, AlertKind, AlertThresholds, Severity};
pub use classifier::{classify_price_series, classify_price_state, classify_weather_state};
pub use domain::{
    CurrentWeather, Level, MarkovState, PriceRecord, PriceState, WeatherReading, WeatherState,
};
pub use markov::{
    EstimatedMatrix, MatrixError, PriceMatrixDefaults, TransitionMatrix, TransitionMatrixBuilder,
};
pub use rng::SeedHierarchy;
pub use simulate::{
    Band, PriceModel, PricePerturbation, PriceStep, StochasticSimulator, Trajectory,
    WeatherModel, WeatherProfiles, WeatherStep,
};
pub use trend::{TrendLabel, TrendOutlook};
pub use volatility::VolatilityEstimator;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine types can move across worker threads.
    ///
    /// Batch forecasting hands matrices, trajectories and configs to rayon
    /// workers; a non-Send field added here breaks the build immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<TransitionMatrix<PriceState>>();
        require_sync::<TransitionMatrix<PriceState>>();
        require_send::<TransitionMatrix<WeatherState>>();
        require_sync::<TransitionMatrix<WeatherState>>();
        require_send::<Trajectory<PriceStep>>();
        require_sync::<Trajectory<PriceStep>>();
        require_send::<Trajectory<WeatherStep>>();
        require_sync::<Trajectory<WeatherStep>>();
        require_send::<Alert>();
        require_sync::<Alert>();
        require_send::<PricePerturbation>();
        require_sync::<PricePerturbation>();
        require_send::<WeatherProfiles>();
        require_sync::<WeatherProfiles>();
        require_send::<PriceMatrixDefaults>();
        require_sync::<PriceMatrixDefaults>();
        require_send::<SeedHierarchy>();
        require_sync::<SeedHierarchy>();
    }

    /// Architecture contract: simulation takes its randomness as a parameter.
    ///
    /// If `simulate` ever stops accepting the caller's RNG, this stops
    /// compiling.
    #[test]
    fn simulator_takes_injected_rng() {
        fn _check<R: rand::Rng>(
            m: &TransitionMatrix<PriceState>,
            rng: &mut R,
        ) -> Trajectory<PriceState> {
            StochasticSimulator::new(m).simulate_states(PriceState::Stable, 3, rng)
        }
    }
}
