//! Threshold alerts over a simulated weather trajectory.
//!
//! Rules are evaluated independently per step, so one day can raise several
//! alerts (a storm that is also cold, for instance).

use serde::{Deserialize, Serialize};

use crate::domain::WeatherState;
use crate::simulate::{Trajectory, WeatherStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    StormWarning,
    HeavyRainfall,
    HeatStress,
    ColdStress,
}

impl AlertKind {
    pub fn severity(self) -> Severity {
        match self {
            Self::StormWarning => Severity::High,
            Self::HeavyRainfall | Self::HeatStress => Severity::Medium,
            Self::ColdStress => Severity::Low,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::StormWarning => "Severe Storm Warning",
            Self::HeavyRainfall => "Heavy Rainfall Alert",
            Self::HeatStress => "High Temperature Alert",
            Self::ColdStress => "Low Temperature Alert",
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            Self::StormWarning => "Harvest mature crops, reinforce structures, secure equipment",
            Self::HeavyRainfall => {
                "Clear drainage channels, postpone irrigation, protect low-lying areas"
            }
            Self::HeatStress => "Increase irrigation frequency, provide shade for sensitive crops",
            Self::ColdStress => "Cover sensitive plants, reduce irrigation, use frost protection",
        }
    }

    pub fn crop_impact(self) -> &'static str {
        match self {
            Self::StormWarning => "High risk of physical damage to crops",
            Self::HeavyRainfall => "Risk of waterlogging in poorly drained fields",
            Self::HeatStress => "Potential for heat stress in vegetables and flowers",
            Self::ColdStress => "Risk of cold damage to tropical crops",
        }
    }
}

/// A derived, never-persisted event bound to one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub day: usize,
    pub kind: AlertKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub action: String,
    pub crop_impact: String,
}

impl Alert {
    fn new(day: usize, kind: AlertKind, message: String) -> Self {
        Self {
            day,
            kind,
            severity: kind.severity(),
            title: kind.title().to_string(),
            message,
            action: kind.action().to_string(),
            crop_impact: kind.crop_impact().to_string(),
        }
    }
}

/// Trigger levels. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// Rainy-day rainfall above this (mm) is heavy.
    pub heavy_rain_mm: f64,
    /// Temperature above this (C) is heat stress.
    pub heat_c: f64,
    /// Temperature below this (C) is cold stress.
    pub cold_c: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            heavy_rain_mm: 25.0,
            heat_c: 35.0,
            cold_c: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertEngine {
    thresholds: AlertThresholds,
}

impl AlertEngine {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn scan(&self, trajectory: &Trajectory<WeatherStep>) -> Vec<Alert> {
        trajectory.iter().flat_map(|s| self.evaluate(s)).collect()
    }

    /// Every rule that fires on one step, in rule order.
    pub fn evaluate(&self, step: &WeatherStep) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut alerts = Vec::new();

        if step.state == WeatherState::Storm {
            alerts.push(Alert::new(
                step.day,
                AlertKind::StormWarning,
                format!(
                    "High winds ({:.1} km/h) and heavy rain ({:.1}mm) expected.",
                    step.wind_speed, step.rainfall_mm
                ),
            ));
        }
        if step.state == WeatherState::Rainy && step.rainfall_mm > t.heavy_rain_mm {
            alerts.push(Alert::new(
                step.day,
                AlertKind::HeavyRainfall,
                format!(
                    "Expected rainfall: {:.1}mm. Ensure proper drainage.",
                    step.rainfall_mm
                ),
            ));
        }
        if step.temperature > t.heat_c {
            alerts.push(Alert::new(
                step.day,
                AlertKind::HeatStress,
                format!(
                    "Temperature: {:.1}°C. Risk of heat stress.",
                    step.temperature
                ),
            ));
        }
        if step.temperature < t.cold_c {
            alerts.push(Alert::new(
                step.day,
                AlertKind::ColdStress,
                format!(
                    "Temperature: {:.1}°C. Protect sensitive crops.",
                    step.temperature
                ),
            ));
        }

        alerts
    }
}
