//! Bounds-checked gate for (odds, probability) pairs.
//!
//! Every externally supplied pair passes through [`validate_bet`] (or
//! [`validate_bet_values`]) before EV or Kelly math touches it.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use super::distributions::clamp01;
use super::odds::MIN_ODDS;

const EPS: f64 = 1e-12;

/// Why a bet candidate was rejected. `Display` is the user-facing reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BetValidationError {
    #[error("Invalid odds (NaN/Inf): {0}")]
    NonFiniteOdds(String),
    #[error("Invalid probability (NaN/Inf): {0}")]
    NonFiniteProb(String),
    #[error("Invalid odds (must be >= 1.01): {0}")]
    OddsTooLow(f64),
    #[error("Invalid probability (must be in [0,1]): {0}")]
    ProbOutOfRange(f64),
}

/// A pair that passed the gate. `p` is hard-clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidatedBet {
    pub odds: f64,
    pub p: f64,
}

/// Coerce a JSON number or numeric string to `f64`; `NaN` otherwise.
pub fn to_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|x| x.is_finite()).unwrap_or(f64::NAN)
}

/// Probability in [0, 1] with 1e-12 slack on both ends.
pub fn is_valid_prob(p: f64) -> bool {
    p.is_finite() && p >= -EPS && p <= 1.0 + EPS
}

/// Decimal odds at or above the realistic minimum of 1.01.
pub fn is_valid_odds(odds: f64) -> bool {
    odds.is_finite() && odds >= MIN_ODDS
}

/// Validate already-numeric inputs.
pub fn validate_bet_values(odds: f64, p: f64) -> Result<ValidatedBet, BetValidationError> {
    if !odds.is_finite() {
        return Err(BetValidationError::NonFiniteOdds(odds.to_string()));
    }
    if !p.is_finite() {
        return Err(BetValidationError::NonFiniteProb(p.to_string()));
    }
    if !is_valid_odds(odds) {
        return Err(BetValidationError::OddsTooLow(odds));
    }
    if !is_valid_prob(p) {
        return Err(BetValidationError::ProbOutOfRange(p));
    }

    Ok(ValidatedBet {
        odds,
        p: clamp01(p),
    })
}

/// Validate raw JSON inputs, echoing the original value in the reason.
pub fn validate_bet(odds: &Value, p: &Value) -> Result<ValidatedBet, BetValidationError> {
    let odds_n = to_number(odds);
    let p_n = to_number(p);

    if !odds_n.is_finite() {
        return Err(BetValidationError::NonFiniteOdds(display_raw(odds)));
    }
    if !p_n.is_finite() {
        return Err(BetValidationError::NonFiniteProb(display_raw(p)));
    }
    validate_bet_values(odds_n, p_n)
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
