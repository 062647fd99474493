//! Cumulative forecast change to a qualitative outlook.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendLabel {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    #[serde(rename = "Bullish")]
    Bullish,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Mild Bearish")]
    MildBearish,
    #[serde(rename = "Bearish")]
    Bearish,
}

impl TrendLabel {
    /// Cut points on cumulative percent change, checked in this order:
    /// `> 8` strong bullish, `> 3` bullish, `< -5` bearish, `< -2` mild
    /// bearish, otherwise neutral.
    pub fn from_change_pct(change_pct: f64) -> Self {
        if change_pct > 8.0 {
            Self::StrongBullish
        } else if change_pct > 3.0 {
            Self::Bullish
        } else if change_pct < -5.0 {
            Self::Bearish
        } else if change_pct < -2.0 {
            Self::MildBearish
        } else {
            Self::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBullish => "Strong Bullish",
            Self::Bullish => "Bullish",
            Self::Neutral => "Neutral",
            Self::MildBearish => "Mild Bearish",
            Self::Bearish => "Bearish",
        }
    }

    /// Advice to a grower holding the crop.
    pub fn recommendation(self) -> &'static str {
        match self {
            Self::StrongBullish => "Excellent time to sell",
            Self::Bullish => "Good time to sell",
            Self::Neutral => "Maintain current strategy",
            Self::MildBearish => "Hold current position",
            Self::Bearish => "Consider waiting to sell",
        }
    }

    pub fn confidence(self) -> Level {
        match self {
            Self::StrongBullish => Level::High,
            Self::Bullish | Self::Bearish => Level::Medium,
            Self::MildBearish | Self::Neutral => Level::Low,
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label, recommendation and confidence for one forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendOutlook {
    pub label: TrendLabel,
    pub recommendation: String,
    pub confidence: Level,
    pub change_pct: f64,
}

impl TrendOutlook {
    pub fn from_change_pct(change_pct: f64) -> Self {
        let label = TrendLabel::from_change_pct(change_pct);
        Self {
            label,
            recommendation: label.recommendation().to_string(),
            confidence: label.confidence(),
            change_pct,
        }
    }
}
