//! Weather magnitudes: per-state ranges applied additively to the day-0
//! anchor, or jitter around historical per-state means when history exists.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{round_to, Band, MagnitudeModel, Transition};
use crate::domain::{CurrentWeather, MarkovState, WeatherReading, WeatherState};

/// Humidity can never leave this band, whatever the profile says.
pub const HUMIDITY_LIMITS: Band = Band::new(0.0, 100.0);

/// Draw ranges for one state when no history is available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeProfile {
    /// Added to the anchor temperature (C).
    pub temperature_offset: Band,
    /// Added to the anchor humidity (%).
    pub humidity_offset: Band,
    pub humidity_bounds: Band,
    /// Absolute, km/h.
    pub wind_speed: Band,
    /// Absolute, mm. Ignored for dry states.
    pub rainfall: Band,
}

/// One profile per weather state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherProfiles {
    pub sunny: MagnitudeProfile,
    pub cloudy: MagnitudeProfile,
    pub rainy: MagnitudeProfile,
    pub storm: MagnitudeProfile,
}

impl WeatherProfiles {
    pub fn for_state(&self, state: WeatherState) -> &MagnitudeProfile {
        match state {
            WeatherState::Sunny => &self.sunny,
            WeatherState::Cloudy => &self.cloudy,
            WeatherState::Rainy => &self.rainy,
            WeatherState::Storm => &self.storm,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeatherState, &MagnitudeProfile)> {
        WeatherState::ALPHABET
            .iter()
            .map(move |s| (*s, self.for_state(*s)))
    }
}

impl Default for WeatherProfiles {
    fn default() -> Self {
        Self {
            sunny: MagnitudeProfile {
                temperature_offset: Band::new(-2.0, 5.0),
                humidity_offset: Band::new(-25.0, -5.0),
                humidity_bounds: Band::new(30.0, 100.0),
                wind_speed: Band::new(5.0, 15.0),
                rainfall: Band::new(0.0, 0.0),
            },
            cloudy: MagnitudeProfile {
                temperature_offset: Band::new(-3.0, 2.0),
                humidity_offset: Band::new(0.0, 20.0),
                humidity_bounds: Band::new(0.0, 100.0),
                wind_speed: Band::new(8.0, 20.0),
                rainfall: Band::new(0.0, 0.0),
            },
            rainy: MagnitudeProfile {
                temperature_offset: Band::new(-8.0, -2.0),
                humidity_offset: Band::new(15.0, 30.0),
                humidity_bounds: Band::new(0.0, 95.0),
                wind_speed: Band::new(12.0, 25.0),
                rainfall: Band::new(5.0, 35.0),
            },
            storm: MagnitudeProfile {
                temperature_offset: Band::new(-10.0, -4.0),
                humidity_offset: Band::new(20.0, 35.0),
                humidity_bounds: Band::new(0.0, 98.0),
                wind_speed: Band::new(25.0, 45.0),
                rainfall: Band::new(30.0, 80.0),
            },
        }
    }
}

/// Symmetric jitter half-widths applied around historical means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimatologyJitter {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
    pub humidity_bounds: Band,
}

impl Default for ClimatologyJitter {
    fn default() -> Self {
        Self {
            temperature: 3.0,
            humidity: 10.0,
            wind_speed: 5.0,
            rainfall: 5.0,
            humidity_bounds: Band::new(30.0, 98.0),
        }
    }
}

/// Mean conditions observed on days in one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMeans {
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
    pub samples: usize,
}

/// Per-state historical averages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateClimatology {
    means: Vec<Option<StateMeans>>,
}

impl StateClimatology {
    pub fn from_readings(readings: &[WeatherReading]) -> Self {
        let n = WeatherState::alphabet_size();
        let mut sums = vec![[0.0f64; 4]; n];
        let mut counts = vec![0usize; n];
        for r in readings {
            let i = r.state.index();
            sums[i][0] += r.temperature;
            sums[i][1] += r.humidity;
            sums[i][2] += r.wind_speed;
            sums[i][3] += r.rainfall;
            counts[i] += 1;
        }
        let means = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| {
                (c > 0).then(|| {
                    let c_f = c as f64;
                    StateMeans {
                        temperature: s[0] / c_f,
                        humidity: s[1] / c_f,
                        wind_speed: s[2] / c_f,
                        rainfall: s[3] / c_f,
                        samples: c,
                    }
                })
            })
            .collect();
        Self { means }
    }

    pub fn get(&self, state: WeatherState) -> Option<&StateMeans> {
        self.means.get(state.index()).and_then(Option::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.means.iter().all(Option::is_none)
    }
}

/// One simulated forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherStep {
    pub day: usize,
    pub state: WeatherState,
    pub from: WeatherState,
    pub probability: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall_mm: f64,
    pub wind_speed: f64,
}

/// Draws daily conditions for each simulated state.
#[derive(Debug, Clone)]
pub struct WeatherModel<'a> {
    profiles: &'a WeatherProfiles,
    jitter: &'a ClimatologyJitter,
    anchor: &'a CurrentWeather,
    climatology: Option<&'a StateClimatology>,
}

impl<'a> WeatherModel<'a> {
    pub fn new(
        profiles: &'a WeatherProfiles,
        jitter: &'a ClimatologyJitter,
        anchor: &'a CurrentWeather,
    ) -> Self {
        Self {
            profiles,
            jitter,
            anchor,
            climatology: None,
        }
    }

    /// Center draws on historical per-state means where available.
    pub fn with_climatology(mut self, climatology: &'a StateClimatology) -> Self {
        self.climatology = Some(climatology);
        self
    }

    fn from_means<R: Rng + ?Sized>(
        &self,
        state: WeatherState,
        m: &StateMeans,
        rng: &mut R,
    ) -> (f64, f64, f64, f64) {
        let j = self.jitter;
        let temperature = m.temperature + symmetric(j.temperature).draw(rng);
        let humidity = j
            .humidity_bounds
            .clamp(m.humidity + symmetric(j.humidity).draw(rng));
        let wind = (m.wind_speed + symmetric(j.wind_speed).draw(rng)).max(0.0);
        let rain = if state.is_wet() {
            (m.rainfall + symmetric(j.rainfall).draw(rng)).max(0.0)
        } else {
            0.0
        };
        (temperature, humidity, wind, rain)
    }

    fn from_profile<R: Rng + ?Sized>(
        &self,
        state: WeatherState,
        rng: &mut R,
    ) -> (f64, f64, f64, f64) {
        let p = self.profiles.for_state(state);
        let temperature = self.anchor.temperature + p.temperature_offset.draw(rng);
        let humidity = p
            .humidity_bounds
            .clamp(self.anchor.humidity + p.humidity_offset.draw(rng));
        let wind = p.wind_speed.draw(rng).max(0.0);
        let rain = if state.is_wet() {
            p.rainfall.draw(rng).max(0.0)
        } else {
            0.0
        };
        (temperature, humidity, wind, rain)
    }
}

impl MagnitudeModel<WeatherState> for WeatherModel<'_> {
    type Step = WeatherStep;

    fn advance<R: Rng + ?Sized>(
        &mut self,
        transition: &Transition<WeatherState>,
        rng: &mut R,
    ) -> WeatherStep {
        let state = transition.to;
        let means = self.climatology.and_then(|c| c.get(state));
        let (temperature, humidity, wind, rain) = match means {
            Some(m) => self.from_means(state, m, rng),
            None => self.from_profile(state, rng),
        };
        WeatherStep {
            day: transition.day,
            state,
            from: transition.from,
            probability: transition.probability,
            temperature: round_to(temperature, 1),
            humidity: round_to(HUMIDITY_LIMITS.clamp(humidity), 0),
            rainfall_mm: round_to(rain, 1),
            wind_speed: round_to(wind, 1),
        }
    }
}

fn symmetric(half_width: f64) -> Band {
    let w = half_width.abs();
    Band::new(-w, w)
}
