//! Weather penalties applied to expected goals before the score grid is built.

use serde::{Deserialize, Serialize};

/// Reported conditions, e.g. `{ "condition": "RAIN", "intensity": "heavy" }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub condition: String,
    #[serde(default)]
    pub intensity: Option<String>,
}

const DEFAULT_INTENSITY: &str = "moderate";

/// Condition → intensity tiers (fractional xG reduction). The first tier is
/// the fallback when the reported intensity is not listed.
const PENALTIES: &[(&str, &[(&str, f64)])] = &[
    ("RAIN", &[("heavy", 0.10), ("light", 0.02)]),
    ("SNOW", &[("heavy", 0.20), ("light", 0.05)]),
    ("WIND", &[("strong", 0.15), ("moderate", 0.05)]),
    ("HEAT", &[("extreme", 0.05)]),
];

/// Fractional reduction for a report; 0 for unknown conditions.
pub fn weather_penalty(report: &WeatherReport) -> f64 {
    let condition = report.condition.trim().to_uppercase();
    let intensity = report
        .intensity
        .as_deref()
        .map_or_else(|| DEFAULT_INTENSITY.to_string(), |s| s.trim().to_lowercase());

    PENALTIES
        .iter()
        .find(|(c, _)| *c == condition)
        .and_then(|(_, tiers)| {
            tiers
                .iter()
                .find(|(name, _)| *name == intensity)
                .or_else(|| tiers.first())
        })
        .map_or(0.0, |(_, penalty)| *penalty)
}

/// Scale a team's expected goals for the weather.
pub fn adjust_for_weather(lambda: f64, weather: Option<&WeatherReport>) -> f64 {
    match weather {
        Some(w) if !w.condition.trim().is_empty() => lambda * (1.0 - weather_penalty(w)),
        _ => lambda,
    }
}
