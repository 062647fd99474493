//! Multi-step Markov trajectory simulation.
//!
//! The driver draws one next state per step from the transition matrix, then
//! hands the transition to a domain [`MagnitudeModel`] which turns it into
//! continuous values (price level, or temperature/humidity/wind/rainfall).
//! All randomness comes from the caller's RNG, so a fixed seed with fixed
//! inputs reproduces the trajectory exactly.

pub mod price;
pub mod weather;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::MarkovState;
use crate::markov::TransitionMatrix;

pub use price::{PriceModel, PricePerturbation, PriceStep};
pub use weather::{
    ClimatologyJitter, MagnitudeProfile, StateClimatology, StateMeans, WeatherModel,
    WeatherProfiles, WeatherStep,
};

/// Closed interval `[lo, hi]` for uniform draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lo: f64,
    pub hi: f64,
}

impl Band {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Uniform draw. A zero-width band returns `lo` and still consumes one
    /// value from `rng`, keeping the stream aligned.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        self.lo + (self.hi - self.lo) * u
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.lo).min(self.hi)
    }

    pub fn is_ordered(&self) -> bool {
        self.lo.is_finite() && self.hi.is_finite() && self.lo <= self.hi
    }
}

/// One drawn state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<S> {
    /// 1-based forecast day.
    pub day: usize,
    pub from: S,
    pub to: S,
    /// Matrix probability of `from -> to`.
    pub probability: f64,
}

/// Turns drawn transitions into domain magnitudes.
///
/// Implementations may carry state between steps (e.g. the previous price).
pub trait MagnitudeModel<S: MarkovState> {
    type Step;

    fn advance<R: Rng + ?Sized>(&mut self, transition: &Transition<S>, rng: &mut R)
        -> Self::Step;
}

/// Fixed-length, immutable sequence of simulated steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Trajectory<T> {
    steps: Vec<T>,
}

impl<T> Trajectory<T> {
    pub fn steps(&self) -> &[T] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.steps.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.steps.last()
    }

    pub fn into_steps(self) -> Vec<T> {
        self.steps
    }
}

impl<'a, T> IntoIterator for &'a Trajectory<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// Walks a transition matrix for a fixed number of steps.
#[derive(Debug, Clone, Copy)]
pub struct StochasticSimulator<'m, S: MarkovState> {
    matrix: &'m TransitionMatrix<S>,
}

impl<'m, S: MarkovState> StochasticSimulator<'m, S> {
    pub fn new(matrix: &'m TransitionMatrix<S>) -> Self {
        Self { matrix }
    }

    /// Simulate `horizon` steps from `initial`. The initial state itself is
    /// not part of the output.
    pub fn simulate<M, R>(
        &self,
        initial: S,
        horizon: usize,
        mut model: M,
        rng: &mut R,
    ) -> Trajectory<M::Step>
    where
        M: MagnitudeModel<S>,
        R: Rng + ?Sized,
    {
        let mut steps = Vec::with_capacity(horizon);
        let mut current = initial;
        for day in 1..=horizon {
            let next = self.matrix.sample(current, rng);
            let transition = Transition {
                day,
                from: current,
                to: next,
                probability: self.matrix.prob(current, next),
            };
            steps.push(model.advance(&transition, rng));
            current = next;
        }
        Trajectory { steps }
    }

    /// States only, with no magnitude model.
    pub fn simulate_states<R: Rng + ?Sized>(
        &self,
        initial: S,
        horizon: usize,
        rng: &mut R,
    ) -> Trajectory<S> {
        self.simulate(initial, horizon, StatesOnly, rng)
    }
}

struct StatesOnly;

impl<S: MarkovState> MagnitudeModel<S> for StatesOnly {
    type Step = S;

    fn advance<R: Rng + ?Sized>(&mut self, transition: &Transition<S>, _rng: &mut R) -> S {
        transition.to
    }
}

/// Round to `places` decimals, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
