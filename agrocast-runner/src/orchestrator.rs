//! Forecast orchestration: collaborators in, payload out.
//!
//! Both entry points follow the same pipeline: fetch observations (live or
//! fallback), classify, build a transition matrix, simulate with the caller's
//! RNG, then summarise. Neither returns an error; degraded inputs show up as
//! lower quality tags and a `fallback` source tag.

use chrono::{NaiveDate, Utc};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use agrocast_core::markov::weather_sparse_rows;
use agrocast_core::simulate::{round_to, StateClimatology};
use agrocast_core::{
    classify_price_series, classify_price_state, AlertEngine, Level, MarkovState, PriceModel,
    PriceState, SeedHierarchy, StochasticSimulator, TransitionMatrixBuilder, TrendOutlook,
    WeatherModel, WeatherState,
};

use crate::config::ForecastConfig;
use crate::provider::{
    DataGovPriceFeed, FallbackPriceFeed, FallbackWeatherFeed, OpenWeatherFeed, PriceFeed,
    WeatherFeed,
};
use crate::report::{
    ForecastDay, HistorySource, MatrixBasis, PriceForecast, WeatherForecast, WeatherSummary,
};
use crate::risk::{farming_suggestions, overall_risk};
use crate::synth::{HistorySynthesizer, MarkovWeatherSynthesizer};

/// A price forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRequest {
    pub crop: String,
    /// Requested steps. Non-positive means "use the default".
    pub horizon: i64,
    /// Optional start-state label overriding the observed state.
    #[serde(default)]
    pub initial_state: Option<String>,
    pub as_of: NaiveDate,
}

impl PriceRequest {
    pub fn new(crop: impl Into<String>, horizon: i64) -> Self {
        Self {
            crop: crop.into(),
            horizon,
            initial_state: None,
            as_of: Utc::now().date_naive(),
        }
    }

    pub fn with_initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }
}

/// A weather forecast request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRequest {
    pub location: String,
    pub horizon: i64,
    #[serde(default)]
    pub initial_state: Option<String>,
    pub as_of: NaiveDate,
}

impl WeatherRequest {
    pub fn new(location: impl Into<String>, horizon: i64) -> Self {
        Self {
            location: location.into(),
            horizon,
            initial_state: None,
            as_of: Utc::now().date_naive(),
        }
    }

    pub fn with_initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = as_of;
        self
    }
}

/// Composes feeds, synthesizer and engine into forecasts.
///
/// Holds no per-request state, so one instance can serve concurrent callers
/// as long as each brings its own RNG.
pub struct ForecastOrchestrator {
    config: ForecastConfig,
    prices: Box<dyn PriceFeed>,
    weather: Box<dyn WeatherFeed>,
    synthesizer: Box<dyn HistorySynthesizer>,
    alerts: AlertEngine,
}

impl ForecastOrchestrator {
    pub fn new(
        config: ForecastConfig,
        prices: Box<dyn PriceFeed>,
        weather: Box<dyn WeatherFeed>,
    ) -> Self {
        let alerts = AlertEngine::new(config.alerts);
        Self {
            config,
            prices,
            weather,
            synthesizer: Box::new(MarkovWeatherSynthesizer),
            alerts,
        }
    }

    /// Fallback tables only; never touches the network.
    pub fn offline(config: ForecastConfig) -> Self {
        Self::new(
            config,
            Box::new(FallbackPriceFeed),
            Box::new(FallbackWeatherFeed),
        )
    }

    /// Live feeds keyed from the environment. A feed whose key is missing is
    /// replaced by its fallback table.
    pub fn from_env(config: ForecastConfig) -> Self {
        let prices: Box<dyn PriceFeed> = match DataGovPriceFeed::from_env() {
            Ok(feed) => Box::new(feed),
            Err(e) => {
                warn!(error = %e, "live price feed unavailable, serving fallback table");
                Box::new(FallbackPriceFeed)
            }
        };
        let weather: Box<dyn WeatherFeed> = match OpenWeatherFeed::from_env() {
            Ok(feed) => Box::new(feed),
            Err(e) => {
                warn!(error = %e, "live weather feed unavailable, serving fallback table");
                Box::new(FallbackWeatherFeed)
            }
        };
        Self::new(config, prices, weather)
    }

    /// Replace the weather history synthesizer.
    pub fn with_synthesizer(mut self, synthesizer: Box<dyn HistorySynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Seed hierarchy from the configured master seed, or OS entropy.
    pub fn seed_hierarchy(&self) -> SeedHierarchy {
        self.config
            .seed
            .map_or_else(SeedHierarchy::from_entropy, SeedHierarchy::new)
    }

    pub fn predict_price<R: Rng>(&self, request: &PriceRequest, rng: &mut R) -> PriceForecast {
        let pc = &self.config.price;
        let horizon = self.config.horizon.resolve(request.horizon);
        let obs = self.prices.fetch_prices(&request.crop);

        let observed_state = classify_price_state(obs.change_pct);
        let start = start_state(request.initial_state.as_deref(), observed_state);

        let prices: Vec<f64> = obs.history.iter().map(|r| r.price).collect();
        let (matrix, quality, basis) = if obs.history.len() >= pc.min_history {
            let states = classify_price_series(&prices);
            let builder = TransitionMatrixBuilder::new(
                pc.smoothing_alpha,
                pc.matrices.sparse_rows.clone(),
            );
            let est = builder.build(&states);
            let basis = if est.defaulted_rows.len() == PriceState::alphabet_size() {
                MatrixBasis::SparseDefault
            } else {
                MatrixBasis::Empirical
            };
            (est.matrix, est.quality, basis)
        } else {
            debug!(
                crop = %request.crop,
                records = obs.history.len(),
                trend = %obs.trend,
                "short price history, using trend matrix"
            );
            (
                pc.matrices.for_trend(obs.trend).clone(),
                Level::Low,
                MatrixBasis::TrendDefault,
            )
        };
        let volatility = pc.volatility.estimate(&prices);

        let model = PriceModel::new(&pc.perturbation, obs.current_price, volatility, obs.trend);
        let trajectory = StochasticSimulator::new(&matrix).simulate(start, horizon, model, rng);

        let final_price = trajectory.last().map_or(obs.current_price, |s| s.price);
        let total_change = final_price - obs.current_price;
        let change_pct = if obs.current_price > 0.0 {
            total_change / obs.current_price * 100.0
        } else {
            0.0
        };
        let outlook = TrendOutlook::from_change_pct(change_pct);

        info!(
            crop = %request.crop,
            horizon,
            source = ?obs.source,
            trend = %outlook.label,
            "price forecast"
        );

        let predicted_trends: Vec<PriceState> = trajectory.iter().map(|s| s.state).collect();
        let mut state_sequence = Vec::with_capacity(horizon + 1);
        state_sequence.push(start);
        state_sequence.extend(predicted_trends.iter().copied());

        PriceForecast {
            crop: request.crop.clone(),
            as_of: request.as_of,
            current_price: obs.current_price,
            current_state: observed_state,
            market_trend: obs.trend,
            recent_change_percent: obs.change_pct,
            forecast_steps: horizon,
            predicted_trends,
            predicted_prices: trajectory.iter().map(|s| s.price).collect(),
            state_sequence,
            overall_trend: outlook.label,
            price_change_percent: round_to(change_pct, 2),
            total_price_change: round_to(total_change, 2),
            recommendation: outlook.recommendation,
            confidence: outlook.confidence,
            volatility: round_to(volatility * 100.0, 2),
            transition_matrix: matrix,
            matrix_quality: quality,
            matrix_basis: basis,
            historical_records_used: obs.history.len(),
            data_source: obs.source,
            source_name: obs.source_name,
            steps: trajectory.into_steps(),
            market: obs.market,
        }
    }

    pub fn predict_weather<R: Rng>(
        &self,
        request: &WeatherRequest,
        rng: &mut R,
    ) -> WeatherForecast {
        let wc = &self.config.weather;
        let horizon = self.config.horizon.resolve(request.horizon);
        let obs = self.weather.fetch_weather(&request.location);

        let (history, history_source) = if obs.history.is_empty() {
            let rng_dyn: &mut dyn RngCore = &mut *rng;
            let h = self.synthesizer.synthesize(
                &request.location,
                request.as_of,
                wc.history_days,
                rng_dyn,
            );
            (h, HistorySource::Synthesized)
        } else {
            (obs.history.clone(), HistorySource::Observed)
        };

        let states: Vec<WeatherState> = history.iter().map(|r| r.state).collect();
        let estimate =
            TransitionMatrixBuilder::new(wc.smoothing_alpha, weather_sparse_rows()).build(&states);
        let climatology = StateClimatology::from_readings(&history);

        let current = &obs.current;
        let start = start_state(request.initial_state.as_deref(), current.state);
        let model =
            WeatherModel::new(&wc.profiles, &wc.jitter, current).with_climatology(&climatology);
        let trajectory =
            StochasticSimulator::new(&estimate.matrix).simulate(start, horizon, model, rng);
        let alerts = self.alerts.scan(&trajectory);

        let mut detailed = Vec::with_capacity(trajectory.len() + 1);
        detailed.push(ForecastDay {
            day: 0,
            weather: current.state,
            temperature: current.temperature,
            humidity: current.humidity,
            rainfall_mm: 0.0,
            wind_speed: current.wind_speed,
            is_current: true,
            description: current.description.clone(),
            markov_probability: 1.0,
            transition_from: None,
        });
        detailed.extend(trajectory.iter().map(|s| ForecastDay {
            day: s.day,
            weather: s.state,
            temperature: s.temperature,
            humidity: s.humidity,
            rainfall_mm: s.rainfall_mm,
            wind_speed: s.wind_speed,
            is_current: false,
            description: s.state.label().to_lowercase(),
            markov_probability: round_to(s.probability, 3),
            transition_from: Some(s.from),
        }));

        let total_rainfall: f64 = trajectory.iter().map(|s| s.rainfall_mm).sum();
        let rainy_days = trajectory.iter().filter(|s| s.rainfall_mm > 0.0).count();
        let avg_temperature = if trajectory.is_empty() {
            current.temperature
        } else {
            trajectory.iter().map(|s| s.temperature).sum::<f64>() / trajectory.len() as f64
        };

        let risk_level = overall_risk(&alerts);
        info!(
            location = %request.location,
            horizon,
            source = ?obs.source,
            history = ?history_source,
            alerts = alerts.len(),
            risk = %risk_level,
            "weather forecast"
        );

        WeatherForecast {
            location: request.location.clone(),
            city: obs.city,
            as_of: request.as_of,
            forecast: trajectory.iter().map(|s| s.state).collect(),
            detailed_forecast: detailed,
            summary: WeatherSummary {
                current_temperature: current.temperature,
                current_humidity: current.humidity,
                avg_forecast_temperature: round_to(avg_temperature, 1),
                total_rainfall: round_to(total_rainfall, 1),
                rainy_days,
            },
            farming_suggestions: farming_suggestions(&alerts),
            alerts,
            transition_matrix: estimate.matrix,
            matrix_quality: estimate.quality,
            historical_data_points: history.len(),
            history_source,
            risk_level,
            data_source: obs.source,
            source_name: obs.source_name,
            current_weather: obs.current,
        }
    }
}

/// The override when it names a state in the alphabet, else `observed`.
fn start_state<S: MarkovState>(label: Option<&str>, observed: S) -> S {
    match label {
        None => observed,
        Some(l) => S::from_label(l).unwrap_or_else(|| {
            debug!(label = l, fallback = %observed, "ignoring unknown initial state");
            observed
        }),
    }
}
