//! Weather history synthesis.
//!
//! When a weather feed supplies no history, the orchestrator asks a
//! [`HistorySynthesizer`] for one. The stock implementation walks a
//! secondary Markov chain tuned per location; tests swap in their own.

use chrono::{Datelike, Duration, NaiveDate};
use rand::{Rng, RngCore};
use tracing::warn;

use agrocast_core::markov::normalize_row;
use agrocast_core::simulate::round_to;
use agrocast_core::{MarkovState, TransitionMatrix, WeatherReading, WeatherState};

use crate::provider::fallback::location_key;

/// Produces a chronological history ending the day before `end`.
pub trait HistorySynthesizer: Send + Sync {
    fn synthesize(
        &self,
        location: &str,
        end: NaiveDate,
        days: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<WeatherReading>;
}

/// Climate parameters of one location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationPattern {
    pub base_temperature: f64,
    /// Rain propensity in `[0, 1]`; shifts mass from Sunny to Rainy.
    pub rain_propensity: f64,
    /// Added in spring (Mar-May), subtracted in winter (Dec-Feb).
    pub seasonal_variation: f64,
}

const LOCATION_PATTERNS: &[(&str, LocationPattern)] = &[
    ("delhi", pattern(25.0, 0.10, 8.0)),
    ("mumbai", pattern(28.0, 0.30, 5.0)),
    ("chennai", pattern(30.0, 0.20, 4.0)),
    ("kolkata", pattern(27.0, 0.25, 6.0)),
    ("bangalore", pattern(24.0, 0.15, 3.0)),
];

const DEFAULT_PATTERN: LocationPattern = pattern(25.0, 0.15, 5.0);

const fn pattern(base: f64, rain: f64, seasonal: f64) -> LocationPattern {
    LocationPattern {
        base_temperature: base,
        rain_propensity: rain,
        seasonal_variation: seasonal,
    }
}

/// Pattern for `location`, matched on its lowercased first token.
pub fn location_pattern(location: &str) -> LocationPattern {
    let key = location_key(location);
    LOCATION_PATTERNS
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(DEFAULT_PATTERN, |(_, p)| *p)
}

/// Temperature shift for the month of `date`.
pub fn seasonal_adjustment(date: NaiveDate, variation: f64) -> f64 {
    match date.month() {
        12 | 1 | 2 => -variation,
        3..=5 => variation,
        _ => 0.0,
    }
}

/// Base generator rows, Sunny/Cloudy/Rainy/Storm order.
const GENERATOR_ROWS: [[f64; 4]; 4] = [
    [0.6, 0.3, 0.09, 0.01],
    [0.3, 0.4, 0.28, 0.02],
    [0.2, 0.3, 0.45, 0.05],
    [0.1, 0.2, 0.5, 0.2],
];

const WET_START: [f64; 4] = [0.4, 0.3, 0.25, 0.05];
const DRY_START: [f64; 4] = [0.6, 0.25, 0.13, 0.02];

/// Generator matrix for a location: each base row gets `0.3 * rain` added
/// to Rainy and `0.2 * rain` taken from Sunny, then is renormalised.
pub fn generator_matrix(p: &LocationPattern) -> TransitionMatrix<WeatherState> {
    let rows: Vec<Vec<f64>> = GENERATOR_ROWS
        .iter()
        .map(|base| {
            let mut row = base.to_vec();
            row[WeatherState::Rainy.index()] += p.rain_propensity * 0.3;
            row[WeatherState::Sunny.index()] =
                (row[WeatherState::Sunny.index()] - p.rain_propensity * 0.2).max(0.0);
            normalize_row(&mut row);
            row
        })
        .collect();
    TransitionMatrix::from_rows(rows).unwrap_or_else(|e| {
        warn!(error = %e, "generator matrix rejected, using uniform");
        TransitionMatrix::uniform()
    })
}

/// Location-tuned Markov chain over `days` consecutive days.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkovWeatherSynthesizer;

impl MarkovWeatherSynthesizer {
    fn reading(
        state: WeatherState,
        date: NaiveDate,
        p: &LocationPattern,
        rng: &mut dyn RngCore,
    ) -> WeatherReading {
        let base = p.base_temperature + seasonal_adjustment(date, p.seasonal_variation);
        let (temp, humidity, rainfall, wind): (f64, i32, f64, f64) = match state {
            WeatherState::Sunny => (
                base + rng.gen_range(2.0..=8.0),
                rng.gen_range(30..=60),
                0.0,
                rng.gen_range(5.0..=15.0),
            ),
            WeatherState::Cloudy => (
                base + rng.gen_range(-2.0..=3.0),
                rng.gen_range(50..=80),
                0.0,
                rng.gen_range(8.0..=20.0),
            ),
            WeatherState::Rainy => (
                base + rng.gen_range(-5.0..=2.0),
                rng.gen_range(70..=95),
                rng.gen_range(5.0..=25.0),
                rng.gen_range(12.0..=25.0),
            ),
            WeatherState::Storm => (
                base + rng.gen_range(-8.0..=-2.0),
                rng.gen_range(80..=98),
                rng.gen_range(30.0..=60.0),
                rng.gen_range(25.0..=45.0),
            ),
        };
        WeatherReading {
            date,
            state,
            temperature: round_to(temp, 1),
            humidity: f64::from(humidity),
            wind_speed: round_to(wind, 1),
            rainfall: round_to(rainfall, 1),
        }
    }
}

impl HistorySynthesizer for MarkovWeatherSynthesizer {
    fn synthesize(
        &self,
        location: &str,
        end: NaiveDate,
        days: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<WeatherReading> {
        let p = location_pattern(location);
        let matrix = generator_matrix(&p);
        let start_weights = if p.rain_propensity > 0.25 {
            &WET_START
        } else {
            &DRY_START
        };

        let mut state = draw_weighted(start_weights, rng);
        let mut date = end - Duration::days(days as i64);
        let mut history = Vec::with_capacity(days);
        for _ in 0..days {
            state = matrix.sample(state, rng);
            history.push(Self::reading(state, date, &p, rng));
            date += Duration::days(1);
        }
        history
    }
}

fn draw_weighted(weights: &[f64; 4], rng: &mut dyn RngCore) -> WeatherState {
    let total: f64 = weights.iter().sum();
    let u = rng.gen::<f64>() * total;
    let mut acc = 0.0;
    for (state, w) in WeatherState::ALPHABET.iter().zip(weights) {
        acc += w;
        if u < acc {
            return *state;
        }
    }
    WeatherState::Sunny
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrocast_core::markov::ROW_SUM_TOLERANCE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn known_and_unknown_patterns() {
        assert_eq!(location_pattern("Mumbai, IN").rain_propensity, 0.30);
        assert_eq!(location_pattern("delhi").seasonal_variation, 8.0);
        assert_eq!(location_pattern("Oslo"), DEFAULT_PATTERN);
    }

    #[test]
    fn seasonal_months() {
        let d = |m| NaiveDate::from_ymd_opt(2026, m, 10).unwrap();
        assert_eq!(seasonal_adjustment(d(1), 5.0), -5.0);
        assert_eq!(seasonal_adjustment(d(12), 5.0), -5.0);
        assert_eq!(seasonal_adjustment(d(4), 5.0), 5.0);
        assert_eq!(seasonal_adjustment(d(8), 5.0), 0.0);
    }

    #[test]
    fn generator_rows_are_stochastic_and_wetter_with_rain() {
        let dry = generator_matrix(&pattern(25.0, 0.0, 0.0));
        let wet = generator_matrix(&pattern(25.0, 0.3, 0.0));
        assert!(dry.is_row_stochastic());
        assert!(wet.is_row_stochastic());
        for from in WeatherState::ALPHABET {
            assert!(
                wet.prob(*from, WeatherState::Rainy) > dry.prob(*from, WeatherState::Rainy)
            );
            let sum: f64 = wet.row(*from).iter().sum();
            assert!((sum - 1.0).abs() < ROW_SUM_TOLERANCE);
        }
        assert!((dry.prob(WeatherState::Sunny, WeatherState::Sunny) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn history_is_chronological_and_ends_before_end() {
        let mut rng = StdRng::seed_from_u64(3);
        let h = MarkovWeatherSynthesizer.synthesize("delhi", end(), 90, &mut rng);
        assert_eq!(h.len(), 90);
        assert_eq!(h[0].date, end() - Duration::days(90));
        assert_eq!(h[89].date, end() - Duration::days(1));
        assert!(h.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn readings_respect_state_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let h = MarkovWeatherSynthesizer.synthesize("mumbai", end(), 365, &mut rng);
        for r in &h {
            match r.state {
                WeatherState::Sunny | WeatherState::Cloudy => assert_eq!(r.rainfall, 0.0),
                WeatherState::Rainy => assert!((5.0..=25.0).contains(&r.rainfall)),
                WeatherState::Storm => assert!((30.0..=60.0).contains(&r.rainfall)),
            }
            assert!((30.0..=98.0).contains(&r.humidity));
            assert!(r.wind_speed >= 5.0 && r.wind_speed <= 45.0);
        }
    }

    #[test]
    fn same_seed_same_history() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            MarkovWeatherSynthesizer.synthesize("chennai", end(), 30, &mut rng)
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn zero_days_is_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(MarkovWeatherSynthesizer
            .synthesize("delhi", end(), 0, &mut rng)
            .is_empty());
    }
}
