//! Price magnitudes: multiplicative perturbation per drawn state.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{round_to, Band, MagnitudeModel, Transition};
use crate::domain::PriceState;

/// Per-state relative change table (fractions of the previous price).
///
/// - `Increase`: `increase` draw + `volatility * volatility_weight`, plus
///   `momentum_bonus` when the market trend is also rising.
/// - `Decrease`: mirror image with `decrease`.
/// - `Stable`: `stable` draw scaled by volatility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePerturbation {
    pub increase: Band,
    pub decrease: Band,
    pub stable: Band,
    pub volatility_weight: f64,
    pub momentum_bonus: f64,
}

impl Default for PricePerturbation {
    fn default() -> Self {
        Self {
            increase: Band::new(0.005, 0.03),
            decrease: Band::new(-0.03, -0.005),
            stable: Band::new(-0.01, 0.01),
            volatility_weight: 0.5,
            momentum_bonus: 0.01,
        }
    }
}

/// One simulated trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStep {
    pub day: usize,
    pub state: PriceState,
    pub from: PriceState,
    pub probability: f64,
    /// Price level after the move, rounded to 2 decimals.
    pub price: f64,
    /// Applied relative change, percent.
    pub change_pct: f64,
}

/// Compounds perturbations onto the last simulated price.
#[derive(Debug, Clone)]
pub struct PriceModel<'p> {
    params: &'p PricePerturbation,
    volatility: f64,
    market_trend: PriceState,
    last_price: f64,
}

impl<'p> PriceModel<'p> {
    pub fn new(
        params: &'p PricePerturbation,
        start_price: f64,
        volatility: f64,
        market_trend: PriceState,
    ) -> Self {
        Self {
            params,
            volatility,
            market_trend,
            last_price: start_price,
        }
    }

    /// Relative change for a step that lands in `state`.
    pub fn delta<R: Rng + ?Sized>(&self, state: PriceState, rng: &mut R) -> f64 {
        let p = self.params;
        let vol_push = self.volatility * p.volatility_weight;
        match state {
            PriceState::Increase => {
                let mut d = p.increase.draw(rng) + vol_push;
                if self.market_trend == PriceState::Increase {
                    d += p.momentum_bonus;
                }
                d
            }
            PriceState::Decrease => {
                let mut d = p.decrease.draw(rng) - vol_push;
                if self.market_trend == PriceState::Decrease {
                    d -= p.momentum_bonus;
                }
                d
            }
            PriceState::Stable => p.stable.draw(rng) * self.volatility,
        }
    }

    pub fn last_price(&self) -> f64 {
        self.last_price
    }
}

impl MagnitudeModel<PriceState> for PriceModel<'_> {
    type Step = PriceStep;

    fn advance<R: Rng + ?Sized>(
        &mut self,
        transition: &Transition<PriceState>,
        rng: &mut R,
    ) -> PriceStep {
        let delta = self.delta(transition.to, rng);
        let price = round_to(self.last_price * (1.0 + delta), 2);
        self.last_price = price;
        PriceStep {
            day: transition.day,
            state: transition.to,
            from: transition.from,
            probability: transition.probability,
            price,
            change_pct: round_to(delta * 100.0, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markov::TransitionMatrix;
    use crate::simulate::StochasticSimulator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn constant(state: PriceState) -> TransitionMatrix<PriceState> {
        let mut row = vec![0.0; 3];
        row[crate::domain::MarkovState::index(state)] = 1.0;
        TransitionMatrix::from_rows(vec![row.clone(), row.clone(), row]).unwrap()
    }

    #[test]
    fn increases_compound_upward() {
        let params = PricePerturbation::default();
        let m = constant(PriceState::Increase);
        let model = PriceModel::new(&params, 100.0, 0.1, PriceState::Stable);
        let t = StochasticSimulator::new(&m).simulate(
            PriceState::Stable,
            5,
            model,
            &mut StdRng::seed_from_u64(1),
        );
        let mut prev = 100.0;
        for step in &t {
            // 0.5% + 5% volatility push at minimum
            assert!(step.price >= prev * 1.055 - 0.01, "{step:?}");
            assert!(step.change_pct >= 5.5 && step.change_pct <= 8.0);
            prev = step.price;
        }
    }

    #[test]
    fn decreases_mirror_with_momentum() {
        let params = PricePerturbation::default();
        let model = PriceModel::new(&params, 100.0, 0.1, PriceState::Decrease);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let d = model.delta(PriceState::Decrease, &mut rng);
            // [-0.03, -0.005] - 0.05 - 0.01
            assert!((-0.09 - 1e-12..=-0.065 + 1e-12).contains(&d), "d = {d}");
        }
    }

    #[test]
    fn momentum_only_when_trend_agrees() {
        let params = PricePerturbation {
            increase: Band::new(0.01, 0.01),
            ..PricePerturbation::default()
        };
        let rising = PriceModel::new(&params, 100.0, 0.0, PriceState::Increase);
        let flat = PriceModel::new(&params, 100.0, 0.0, PriceState::Stable);
        let mut rng = StdRng::seed_from_u64(3);
        assert!((rising.delta(PriceState::Increase, &mut rng) - 0.02).abs() < 1e-12);
        assert!((flat.delta(PriceState::Increase, &mut rng) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn stable_moves_scale_with_volatility() {
        let params = PricePerturbation::default();
        let model = PriceModel::new(&params, 100.0, 0.3, PriceState::Increase);
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..200 {
            let d = model.delta(PriceState::Stable, &mut rng);
            assert!(d.abs() <= 0.003 + 1e-12);
        }
    }

    #[test]
    fn model_tracks_last_price() {
        let params = PricePerturbation::default();
        let mut model = PriceModel::new(&params, 42.0, 0.05, PriceState::Stable);
        let t = Transition {
            day: 1,
            from: PriceState::Stable,
            to: PriceState::Stable,
            probability: 0.4,
        };
        let step = model.advance(&t, &mut StdRng::seed_from_u64(5));
        assert_eq!(model.last_price(), step.price);
        assert_eq!(step.probability, 0.4);
    }
}
