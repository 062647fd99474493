//! Coarse low/medium/high tags for matrix quality and forecast confidence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-step trust tag attached to estimates and forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    /// Quality of an estimate backed by `n` observations:
    /// `High` from 5, `Medium` from 3, otherwise `Low`.
    pub fn from_observation_count(n: usize) -> Self {
        if n >= 5 {
            Self::High
        } else if n >= 3 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
