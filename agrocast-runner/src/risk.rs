//! Farm risk roll-up and suggestions from a forecast's alerts.

use agrocast_core::{Alert, AlertKind, Level, Severity};

pub const MAX_SUGGESTIONS: usize = 5;

/// Points per alert: high 2, medium 1, low 0.
pub fn severity_points(severity: Severity) -> u32 {
    match severity {
        Severity::High => 2,
        Severity::Medium => 1,
        Severity::Low => 0,
    }
}

/// Sum of alert points.
pub fn risk_score(alerts: &[Alert]) -> u32 {
    alerts.iter().map(|a| severity_points(a.severity)).sum()
}

/// `>= 3` points is high risk, `>= 2` medium, anything less low.
pub fn overall_risk(alerts: &[Alert]) -> Level {
    match risk_score(alerts) {
        s if s >= 3 => Level::High,
        2 => Level::Medium,
        _ => Level::Low,
    }
}

/// Action a farmer can take ahead of one alert kind.
pub fn suggestion_for(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::HeavyRainfall => "Prepare drainage systems for expected rainfall",
        AlertKind::StormWarning => "Secure farm structures and harvest ripe crops",
        AlertKind::HeatStress | AlertKind::ColdStress => {
            "Adjust irrigation schedule for temperature changes"
        }
    }
}

/// Suggestions in order of first alert, without repeats, capped at
/// [`MAX_SUGGESTIONS`].
pub fn farming_suggestions(alerts: &[Alert]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for alert in alerts {
        let s = suggestion_for(alert.kind);
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
        if !out.iter().any(|o| o == s) {
            out.push(s.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrocast_core::{AlertEngine, WeatherState, WeatherStep};

    fn step(day: usize, state: WeatherState, temperature: f64, rainfall_mm: f64) -> WeatherStep {
        WeatherStep {
            day,
            state,
            from: WeatherState::Sunny,
            probability: 0.5,
            temperature,
            humidity: 70.0,
            rainfall_mm,
            wind_speed: 20.0,
        }
    }

    fn alerts_for(steps: &[WeatherStep]) -> Vec<Alert> {
        let engine = AlertEngine::default();
        steps.iter().flat_map(|s| engine.evaluate(s)).collect()
    }

    #[test]
    fn no_alerts_is_low() {
        assert_eq!(overall_risk(&[]), Level::Low);
        assert!(farming_suggestions(&[]).is_empty());
    }

    #[test]
    fn one_storm_is_medium() {
        let alerts = alerts_for(&[step(1, WeatherState::Storm, 22.0, 40.0)]);
        assert_eq!(risk_score(&alerts), 2);
        assert_eq!(overall_risk(&alerts), Level::Medium);
    }

    #[test]
    fn storm_plus_heavy_rain_is_high() {
        let alerts = alerts_for(&[
            step(1, WeatherState::Storm, 22.0, 40.0),
            step(2, WeatherState::Rainy, 22.0, 30.0),
        ]);
        assert_eq!(risk_score(&alerts), 3);
        assert_eq!(overall_risk(&alerts), Level::High);
        assert_eq!(
            farming_suggestions(&alerts),
            vec![
                "Secure farm structures and harvest ripe crops".to_string(),
                "Prepare drainage systems for expected rainfall".to_string(),
            ]
        );
    }

    #[test]
    fn cold_alerts_score_nothing() {
        let alerts = alerts_for(&[
            step(1, WeatherState::Sunny, 10.0, 0.0),
            step(2, WeatherState::Sunny, 9.0, 0.0),
        ]);
        assert_eq!(alerts.len(), 2);
        assert_eq!(overall_risk(&alerts), Level::Low);
    }

    #[test]
    fn suggestions_are_deduplicated() {
        let steps: Vec<_> = (1..=8)
            .map(|d| step(d, WeatherState::Rainy, 40.0, 30.0))
            .collect();
        let suggestions = farming_suggestions(&alerts_for(&steps));
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
    }
}
