//! Fallback for sports without a dedicated model: tilt the market-implied
//! probability by a confidence-weighted skew.

use serde::{Deserialize, Serialize};

const FLOOR: f64 = 0.01;
const CEIL: f64 = 0.99;
const DEFAULT_MARKET: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FallbackInputs {
    /// Market-implied probability of the selection; 0.5 when unknown.
    #[serde(default)]
    pub implied_prob: Option<f64>,
    /// Additive tilt, e.g. 0.05 for "market is 5 points too low".
    #[serde(default)]
    pub skew: f64,
    /// Weight on the skew in [0, 1]; 1 when absent.
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FallbackProbs {
    pub win: f64,
    pub loss: f64,
}

pub fn calc_generic_probs(inputs: &FallbackInputs) -> FallbackProbs {
    let market = inputs
        .implied_prob
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(DEFAULT_MARKET);
    let skew = if inputs.skew.is_finite() { inputs.skew } else { 0.0 };
    let confidence = inputs
        .confidence
        .filter(|c| c.is_finite())
        .map_or(1.0, |c| c.clamp(0.0, 1.0));

    let win = skew.mul_add(confidence, market).clamp(FLOOR, CEIL);
    FallbackProbs {
        win,
        loss: 1.0 - win,
    }
}
