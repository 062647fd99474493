//! End-to-end forecasts against the offline (fallback) collaborators.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing_subscriber::EnvFilter;

use agrocast_core::markov::ROW_SUM_TOLERANCE;
use agrocast_core::{
    AlertKind, Level, MarkovState, PriceState, Severity, WeatherReading, WeatherState,
};
use agrocast_runner::{
    ForecastConfig, ForecastOrchestrator, HistorySource, HistorySynthesizer, MatrixBasis,
    PriceRequest, SourceTag, WeatherRequest,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn orchestrator() -> ForecastOrchestrator {
    init_tracing();
    ForecastOrchestrator::offline(ForecastConfig::default())
}

fn rows_sum_to_one<S: MarkovState>(m: &agrocast_core::TransitionMatrix<S>) -> bool {
    S::ALPHABET
        .iter()
        .all(|s| (m.row(*s).iter().sum::<f64>() - 1.0).abs() <= ROW_SUM_TOLERANCE)
}

// ── Price ────────────────────────────────────────────────────────────

#[test]
fn wheat_three_step_forecast() {
    let orch = orchestrator();
    let req = PriceRequest::new("wheat", 3).with_as_of(as_of());
    let f = orch.predict_price(&req, &mut StdRng::seed_from_u64(42));

    assert_eq!(f.predicted_prices.len(), 3);
    assert_eq!(f.predicted_trends.len(), 3);
    assert_eq!(f.state_sequence.len(), 4);
    assert!(f.current_price > 0.0);
    assert!(matches!(f.confidence, Level::Low | Level::Medium | Level::High));
    assert_eq!(f.transition_matrix.to_labeled().len(), 3);
    assert!(rows_sum_to_one(&f.transition_matrix));
    assert!(f.predicted_prices.iter().all(|p| *p > 0.0));
}

#[test]
fn wheat_fallback_uses_rising_trend_matrix() {
    let orch = orchestrator();
    let req = PriceRequest::new("Wheat", 3).with_as_of(as_of());
    let f = orch.predict_price(&req, &mut StdRng::seed_from_u64(1));

    assert_eq!(f.data_source, SourceTag::Fallback);
    assert_eq!(f.market_trend, PriceState::Increase);
    // +1.2% sits inside the +-2% band.
    assert_eq!(f.current_state, PriceState::Stable);
    assert_eq!(f.matrix_basis, MatrixBasis::TrendDefault);
    assert_eq!(f.matrix_quality, Level::Low);
    assert_eq!(f.historical_records_used, 0);
    assert_eq!(f.transition_matrix, orch.config().price.matrices.rising);
    // No history: default volatility 10%.
    assert_eq!(f.volatility, 10.0);
}

#[test]
fn price_totals_agree_with_last_price() {
    let orch = orchestrator();
    let req = PriceRequest::new("pulses", 6).with_as_of(as_of());
    let f = orch.predict_price(&req, &mut StdRng::seed_from_u64(9));

    let last = *f.predicted_prices.last().unwrap();
    assert!((f.total_price_change - (last - f.current_price)).abs() < 0.011);
    let pct = (last - f.current_price) / f.current_price * 100.0;
    assert!((f.price_change_percent - pct).abs() < 0.006);
    assert_eq!(f.steps.len(), 6);
    for (i, step) in f.steps.iter().enumerate() {
        assert_eq!(step.day, i + 1);
        assert_eq!(step.from, f.state_sequence[i]);
        assert_eq!(step.state, f.state_sequence[i + 1]);
    }
}

#[test]
fn horizon_is_normalized() {
    let orch = orchestrator();
    let mut rng = StdRng::seed_from_u64(5);
    let mut rice = |horizon| {
        let req = PriceRequest::new("rice", horizon).with_as_of(as_of());
        orch.predict_price(&req, &mut rng)
    };

    let zero = rice(0);
    assert_eq!(zero.forecast_steps, 3);
    assert_eq!(zero.predicted_prices.len(), 3);
    assert_eq!(rice(-2).predicted_prices.len(), 3);
    assert_eq!(rice(400).predicted_prices.len(), 10);

    let req = WeatherRequest::new("delhi", 0).with_as_of(as_of());
    let weather = orch.predict_weather(&req, &mut StdRng::seed_from_u64(5));
    assert_eq!(weather.detailed_forecast.len(), 4);
}

#[test]
fn initial_state_override_sets_start() {
    let orch = orchestrator();
    let req = PriceRequest::new("cotton", 2)
        .with_initial_state("increase")
        .with_as_of(as_of());
    let f = orch.predict_price(&req, &mut StdRng::seed_from_u64(3));
    assert_eq!(f.state_sequence[0], PriceState::Increase);
    assert_eq!(f.steps[0].from, PriceState::Increase);

    let bogus = PriceRequest::new("cotton", 2)
        .with_initial_state("sideways")
        .with_as_of(as_of());
    let f = orch.predict_price(&bogus, &mut StdRng::seed_from_u64(3));
    // cotton falls back to -2.1%, which classifies as Decrease.
    assert_eq!(f.state_sequence[0], PriceState::Decrease);
}

#[test]
fn price_forecast_is_reproducible() {
    let orch = orchestrator();
    let req = PriceRequest::new("groundnut", 5).with_as_of(as_of());
    let a = orch.predict_price(&req, &mut StdRng::seed_from_u64(77));
    let b = orch.predict_price(&req, &mut StdRng::seed_from_u64(77));
    assert_eq!(a, b);
}

#[test]
fn price_payload_field_names() {
    let orch = orchestrator();
    let req = PriceRequest::new("maize", 3).with_as_of(as_of());
    let json = orch
        .predict_price(&req, &mut StdRng::seed_from_u64(2))
        .to_json()
        .unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    for key in [
        "crop",
        "current_price",
        "predicted_trends",
        "predicted_prices",
        "transition_matrix",
        "volatility",
        "overall_trend",
        "recommendation",
        "confidence",
        "matrix_quality",
        "data_source",
    ] {
        assert!(v.get(key).is_some(), "missing {key}");
    }
    assert_eq!(v["data_source"], "fallback");
    assert_eq!(v["as_of"], "2026-10-18");
    assert!(v["transition_matrix"]["Stable"]["Increase"].is_number());
}

// ── Weather ──────────────────────────────────────────────────────────

#[test]
fn weather_five_day_forecast_has_anchor() {
    let orch = orchestrator();
    let req = WeatherRequest::new("Mumbai", 5).with_as_of(as_of());
    let f = orch.predict_weather(&req, &mut StdRng::seed_from_u64(42));

    assert_eq!(f.detailed_forecast.len(), 6);
    assert_eq!(f.forecast.len(), 5);
    let anchor = &f.detailed_forecast[0];
    assert_eq!(anchor.day, 0);
    assert!(anchor.is_current);
    assert_eq!(anchor.weather, WeatherState::Cloudy);
    assert_eq!(anchor.markov_probability, 1.0);
    assert_eq!(anchor.transition_from, None);
    for (i, d) in f.simulated_days().iter().enumerate() {
        assert_eq!(d.day, i + 1);
        assert!(!d.is_current);
        assert!(d.markov_probability > 0.0 && d.markov_probability <= 1.0);
        assert!((0.0..=100.0).contains(&d.humidity));
    }
    assert!(rows_sum_to_one(&f.transition_matrix));
    assert_eq!(f.history_source, HistorySource::Synthesized);
    assert_eq!(f.historical_data_points, 90);
    assert_eq!(f.matrix_quality, Level::High);
}

/// Supplies no history, so every day is drawn from the stock profiles.
struct NoHistory;

impl HistorySynthesizer for NoHistory {
    fn synthesize(
        &self,
        _location: &str,
        _end: NaiveDate,
        _days: usize,
        _rng: &mut dyn RngCore,
    ) -> Vec<WeatherReading> {
        Vec::new()
    }
}

#[test]
fn heavy_rain_and_storm_days_always_alert() {
    let orch = orchestrator().with_synthesizer(Box::new(NoHistory));
    let mut checked = 0;
    for seed in 0..60 {
        let req = WeatherRequest::new("kolkata", 5).with_as_of(as_of());
        let f = orch.predict_weather(&req, &mut StdRng::seed_from_u64(seed));
        for d in f.simulated_days() {
            if d.weather == WeatherState::Rainy && d.rainfall_mm > 25.0 {
                checked += 1;
                assert!(
                    f.alerts
                        .iter()
                        .any(|a| a.day == d.day && a.kind == AlertKind::HeavyRainfall),
                    "seed {seed}: no heavy-rain alert on day {}",
                    d.day
                );
            }
            if d.weather == WeatherState::Storm {
                assert!(f
                    .alerts
                    .iter()
                    .any(|a| a.day == d.day && a.severity == Severity::High));
            }
        }
    }
    assert!(checked > 0, "no heavy-rain day in 60 seeds");
}

#[test]
fn weather_summary_matches_days() {
    let orch = orchestrator();
    let req = WeatherRequest::new("chennai", 7).with_as_of(as_of());
    let f = orch.predict_weather(&req, &mut StdRng::seed_from_u64(8));

    let days = f.simulated_days();
    let rain: f64 = days.iter().map(|d| d.rainfall_mm).sum();
    let avg: f64 = days.iter().map(|d| d.temperature).sum::<f64>() / days.len() as f64;
    assert!((f.summary.total_rainfall - rain).abs() < 0.051);
    assert!((f.summary.avg_forecast_temperature - avg).abs() < 0.051);
    assert_eq!(
        f.summary.rainy_days,
        days.iter().filter(|d| d.rainfall_mm > 0.0).count()
    );
    assert_eq!(f.summary.current_temperature, 34.2);
    assert_eq!(f.summary.current_humidity, 65.0);
    assert!(f.farming_suggestions.len() <= 5);
}

#[test]
fn weather_forecast_is_reproducible() {
    let orch = orchestrator();
    let req = WeatherRequest::new("bangalore", 4).with_as_of(as_of());
    let a = orch.predict_weather(&req, &mut StdRng::seed_from_u64(13));
    let b = orch.predict_weather(&req, &mut StdRng::seed_from_u64(13));
    assert_eq!(a, b);
}

#[test]
fn weather_payload_serializes() {
    let orch = orchestrator();
    let req = WeatherRequest::new("delhi", 3).with_as_of(as_of());
    let json = orch
        .predict_weather(&req, &mut StdRng::seed_from_u64(4))
        .to_json()
        .unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["detailed_forecast"].as_array().unwrap().len(), 4);
    assert!(v["detailed_forecast"][0].get("transition_from").is_none());
    assert!(v["detailed_forecast"][1].get("transition_from").is_some());
    assert!(v["summary"].get("rainy_days").is_some());
    assert!(v["alerts"].is_array());
    let risk = v["risk_level"].as_str().unwrap();
    assert!(["low", "medium", "high"].contains(&risk));
}
