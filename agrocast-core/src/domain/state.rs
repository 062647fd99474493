//! Closed state alphabets for the price and weather domains.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use thiserror::Error;

/// A member of a closed, finite alphabet that a Markov chain moves over.
///
/// `ALPHABET` fixes the canonical index order used by transition matrices,
/// so `ALPHABET[s.index()] == s` must hold for every state.
pub trait MarkovState:
    Copy + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Every state, in canonical index order.
    const ALPHABET: &'static [Self];

    /// Position of this state in `ALPHABET`.
    fn index(self) -> usize;

    /// Human-readable label, also used as the serialized matrix key.
    fn label(self) -> &'static str;

    fn alphabet_size() -> usize {
        Self::ALPHABET.len()
    }

    fn from_index(index: usize) -> Option<Self> {
        Self::ALPHABET.get(index).copied()
    }

    /// Case-insensitive lookup by label.
    fn from_label(label: &str) -> Option<Self> {
        let needle = label.trim();
        Self::ALPHABET
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(needle))
    }
}

/// Error for a label outside the declared alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{label}' is not a {domain} state")]
pub struct UnknownState {
    pub domain: &'static str,
    pub label: String,
}

/// Direction of a commodity price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceState {
    Increase,
    Decrease,
    Stable,
}

impl MarkovState for PriceState {
    const ALPHABET: &'static [Self] = &[Self::Increase, Self::Decrease, Self::Stable];

    fn index(self) -> usize {
        match self {
            Self::Increase => 0,
            Self::Decrease => 1,
            Self::Stable => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Increase => "Increase",
            Self::Decrease => "Decrease",
            Self::Stable => "Stable",
        }
    }
}

/// Discretized daily weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeatherState {
    Sunny,
    Cloudy,
    Rainy,
    Storm,
}

impl WeatherState {
    /// Whether precipitation accompanies this state.
    pub fn is_wet(self) -> bool {
        matches!(self, Self::Rainy | Self::Storm)
    }
}

impl MarkovState for WeatherState {
    const ALPHABET: &'static [Self] = &[Self::Sunny, Self::Cloudy, Self::Rainy, Self::Storm];

    fn index(self) -> usize {
        match self {
            Self::Sunny => 0,
            Self::Cloudy => 1,
            Self::Rainy => 2,
            Self::Storm => 3,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Cloudy => "Cloudy",
            Self::Rainy => "Rainy",
            Self::Storm => "Storm",
        }
    }
}

macro_rules! impl_display_from_str {
    ($ty:ty, $domain:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownState;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as MarkovState>::from_label(s).ok_or_else(|| UnknownState {
                    domain: $domain,
                    label: s.to_string(),
                })
            }
        }
    };
}

impl_display_from_str!(PriceState, "price");
impl_display_from_str!(WeatherState, "weather");
