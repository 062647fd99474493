//! Batch forecasting across many subjects.
//!
//! Each request draws from its own RNG, seeded from the hierarchy by
//! `(domain, subject, position)`, so results do not depend on whether the
//! batch runs in parallel or in which order workers pick requests up.

use rayon::prelude::*;

use agrocast_core::SeedHierarchy;

use crate::orchestrator::{ForecastOrchestrator, PriceRequest, WeatherRequest};
use crate::report::{PriceForecast, WeatherForecast};

pub const PRICE_DOMAIN: &str = "price";
pub const WEATHER_DOMAIN: &str = "weather";

/// Runs batches of forecasts against one orchestrator.
pub struct BatchForecaster<'a> {
    orchestrator: &'a ForecastOrchestrator,
    seeds: SeedHierarchy,
    parallel: bool,
}

impl<'a> BatchForecaster<'a> {
    /// Parallel batch seeded from the orchestrator's configured seed.
    pub fn new(orchestrator: &'a ForecastOrchestrator) -> Self {
        Self {
            seeds: orchestrator.seed_hierarchy(),
            orchestrator,
            parallel: true,
        }
    }

    pub fn with_seeds(mut self, seeds: SeedHierarchy) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn seeds(&self) -> &SeedHierarchy {
        &self.seeds
    }

    /// One forecast per request, in request order.
    pub fn prices(&self, requests: &[PriceRequest]) -> Vec<PriceForecast> {
        let run = |(i, req): (usize, &PriceRequest)| {
            let mut rng = self.seeds.rng_for(PRICE_DOMAIN, &req.crop, i as u64);
            self.orchestrator.predict_price(req, &mut rng)
        };
        if self.parallel {
            requests.par_iter().enumerate().map(run).collect()
        } else {
            requests.iter().enumerate().map(run).collect()
        }
    }

    /// One forecast per request, in request order.
    pub fn weather(&self, requests: &[WeatherRequest]) -> Vec<WeatherForecast> {
        let run = |(i, req): (usize, &WeatherRequest)| {
            let mut rng = self.seeds.rng_for(WEATHER_DOMAIN, &req.location, i as u64);
            self.orchestrator.predict_weather(req, &mut rng)
        };
        if self.parallel {
            requests.par_iter().enumerate().map(run).collect()
        } else {
            requests.iter().enumerate().map(run).collect()
        }
    }
}
