//! Combo / parlay analysis with a compounding correlation penalty.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::distributions::clamp01;
use super::ev::calc_ev;

const EPS: f64 = 1e-12;

/// One selection within a combo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub odds: f64,
    pub p: f64,
    #[serde(default, alias = "matchId")]
    pub match_id: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl Leg {
    pub fn new(odds: f64, p: f64) -> Self {
        Self {
            odds,
            p,
            match_id: None,
            tag: None,
        }
    }

    #[must_use]
    pub fn with_match(mut self, match_id: impl Into<String>) -> Self {
        self.match_id = Some(match_id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboOptions {
    /// Explicit penalty; 0 lets auto-detection decide.
    pub correlation_penalty: f64,
    pub auto_correlation: bool,
    pub auto_penalty_same_match: f64,
}

impl Default for ComboOptions {
    fn default() -> Self {
        Self {
            correlation_penalty: 0.0,
            auto_correlation: true,
            auto_penalty_same_match: 0.08,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComboResult {
    pub odds: f64,
    pub p: f64,
    pub ev: f64,
    pub implied_prob: f64,
    pub edge: f64,
    pub fair_odds: f64,
    pub legs_count: usize,
    pub correlation_penalty_used: f64,
    pub warnings: Vec<String>,
}

impl ComboResult {
    fn empty(warnings: Vec<String>) -> Self {
        Self {
            warnings,
            ..Self::default()
        }
    }
}

fn valid_odds(o: f64) -> bool {
    o.is_finite() && o > 1.0
}

/// Product of decimal odds; `NaN` if empty or any price is invalid.
pub fn calc_combo_odds(odds: &[f64]) -> f64 {
    if odds.is_empty() || !odds.iter().all(|o| valid_odds(*o)) {
        return f64::NAN;
    }
    odds.iter().product()
}

/// Product of clamped probabilities; `NaN` if empty or any is non-finite.
pub fn calc_combo_prob_independent(probs: &[f64]) -> f64 {
    if probs.is_empty() || !probs.iter().all(|p| p.is_finite()) {
        return f64::NAN;
    }
    clamp01(probs.iter().map(|p| clamp01(*p)).product::<f64>())
}

/// `p · (1 − penalty)^(k − 1)`.
pub fn apply_correlation_penalty(raw_prob: f64, penalty: f64, legs: usize) -> f64 {
    let p = clamp01(raw_prob);
    let pen = clamp01(penalty);
    let k = legs.max(1);
    if k <= 1 || pen <= 0.0 {
        return p;
    }
    let exp = i32::try_from(k - 1).unwrap_or(i32::MAX);
    clamp01(p * (1.0 - pen).powi(exp))
}

/// Largest number of legs sharing one non-empty match id.
fn max_same_match(match_ids: &[&str]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in match_ids.iter().copied().filter(|id| !id.is_empty()) {
        *counts.entry(id).or_default() += 1;
    }
    counts.values().copied().max().unwrap_or(1)
}

/// Combine legs into one assessment. Invalid legs are skipped with a
/// warning; nothing here fails.
pub fn analyze_combo(legs: &[Leg], options: &ComboOptions) -> ComboResult {
    if legs.is_empty() {
        return ComboResult::empty(vec!["No legs provided.".to_string()]);
    }

    let mut warnings = Vec::new();
    let mut odds = Vec::with_capacity(legs.len());
    let mut probs = Vec::with_capacity(legs.len());
    let mut match_ids = Vec::with_capacity(legs.len());

    for (i, leg) in legs.iter().enumerate() {
        let odds_ok = valid_odds(leg.odds);
        let prob_ok = leg.p.is_finite();
        if !odds_ok {
            warnings.push(format!("Leg #{}: invalid odds ({}).", i + 1, leg.odds));
        }
        if !prob_ok {
            warnings.push(format!("Leg #{}: invalid probability ({}).", i + 1, leg.p));
        }
        if !(odds_ok && prob_ok) {
            continue;
        }
        odds.push(leg.odds);
        probs.push(clamp01(leg.p));
        match_ids.push(leg.match_id.as_deref().unwrap_or(""));
    }

    if odds.is_empty() {
        if warnings.is_empty() {
            warnings.push("All legs invalid.".to_string());
        }
        return ComboResult::empty(warnings);
    }

    let combined_odds = calc_combo_odds(&odds);
    let raw_prob = calc_combo_prob_independent(&probs);

    let mut penalty = clamp01(options.correlation_penalty);
    if options.auto_correlation && penalty == 0.0 {
        let max_dup = max_same_match(&match_ids);
        if max_dup >= 2 {
            penalty = clamp01(options.auto_penalty_same_match);
            warnings.push(format!(
                "Auto-correlation applied: same-match legs detected (maxDup={max_dup})."
            ));
        }
    }

    let p = apply_correlation_penalty(raw_prob, penalty, odds.len());
    let ev = calc_ev(p, combined_odds);
    let implied_prob = if combined_odds > 1.0 { 1.0 / combined_odds } else { 0.0 };

    debug!(
        legs = odds.len(),
        combined_odds,
        raw_prob,
        penalty,
        p,
        "combo analyzed"
    );

    ComboResult {
        odds: if combined_odds.is_finite() { combined_odds } else { 0.0 },
        p: if p.is_finite() { p } else { 0.0 },
        ev: if ev.is_finite() { ev } else { 0.0 },
        implied_prob,
        edge: p - implied_prob,
        fair_odds: if p > EPS { 1.0 / p } else { 0.0 },
        legs_count: odds.len(),
        correlation_penalty_used: penalty,
        warnings,
    }
}
