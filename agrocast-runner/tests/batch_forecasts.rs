//! Seeded batch forecasting: parallel output equals sequential output.

use chrono::NaiveDate;

use agrocast_core::SeedHierarchy;
use agrocast_runner::{
    BatchForecaster, ForecastConfig, ForecastOrchestrator, PriceRequest, WeatherRequest,
};

const CROPS: &[&str] = &[
    "wheat", "rice", "cotton", "sugarcane", "groundnut", "maize", "paddy", "pulses", "barley",
];

const CITIES: &[&str] = &["delhi", "mumbai", "chennai", "kolkata", "bangalore", "Pune, IN"];

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn orchestrator() -> ForecastOrchestrator {
    let config = ForecastConfig {
        seed: Some(99),
        ..ForecastConfig::default()
    };
    ForecastOrchestrator::offline(config)
}

fn price_requests() -> Vec<PriceRequest> {
    CROPS
        .iter()
        .map(|c| PriceRequest::new(*c, 5).with_as_of(as_of()))
        .collect()
}

#[test]
fn parallel_prices_match_sequential() {
    let orch = orchestrator();
    let requests = price_requests();
    let parallel = BatchForecaster::new(&orch).prices(&requests);
    let sequential = BatchForecaster::new(&orch)
        .with_parallel(false)
        .prices(&requests);

    assert_eq!(parallel.len(), CROPS.len());
    assert_eq!(parallel, sequential);
    for (f, crop) in parallel.iter().zip(CROPS) {
        assert_eq!(f.crop, *crop);
        assert_eq!(f.predicted_prices.len(), 5);
    }
}

#[test]
fn parallel_weather_matches_sequential() {
    let orch = orchestrator();
    let requests: Vec<WeatherRequest> = CITIES
        .iter()
        .map(|c| WeatherRequest::new(*c, 4).with_as_of(as_of()))
        .collect();
    let parallel = BatchForecaster::new(&orch).weather(&requests);
    let sequential = BatchForecaster::new(&orch)
        .with_parallel(false)
        .weather(&requests);
    assert_eq!(parallel, sequential);
    assert!(parallel.iter().all(|f| f.detailed_forecast.len() == 5));
}

#[test]
fn configured_seed_is_used() {
    let orch = orchestrator();
    let batch = BatchForecaster::new(&orch);
    assert_eq!(batch.seeds().master_seed(), 99);
}

#[test]
fn different_master_seeds_diverge() {
    let orch = orchestrator();
    let requests = price_requests();
    let a = BatchForecaster::new(&orch)
        .with_seeds(SeedHierarchy::new(1))
        .prices(&requests);
    let b = BatchForecaster::new(&orch)
        .with_seeds(SeedHierarchy::new(2))
        .prices(&requests);
    assert_ne!(a, b);
}
