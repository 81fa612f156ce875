//! Result Validator - Sanity Checks on an Evaluated Board
//!
//! Hard errors (the board is unusable):
//! - Probability outside [0, 1] or NaN
//! - Odds at or below 1
//! - NaN EV
//! - Negative or NaN stake
//!
//! Warnings (the board is usable but suspicious):
//! - Recommended level with negative EV
//! - High EV graded `Avoid`
//! - Stake above half the bankroll

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::Serialize;

use super::match_evaluator::{EngineResult, Level};

const HIGH_EV: f64 = 0.10;
const HIGH_EV_MIN_ODDS: f64 = 1.2;
const MAX_BANKROLL_SHARE: f64 = 0.5;

/// Outcome of [`validate_engine_result`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
  pub ok: bool,
  pub errors: Vec<String>,
  pub warnings: Vec<String>,
}

/// Check every recommendation on the board.
pub fn validate_engine_result(result: &EngineResult, bankroll: f64) -> ValidationReport {
  let mut errors = Vec::new();
  let mut warnings = Vec::new();

  for (idx, rec) in result.recommendations.iter().enumerate() {
    let prefix = format!("Rec[{idx} - {}]", rec.selection);

    if !(0.0..=1.0).contains(&rec.probability) {
      errors.push(format!("{prefix}: Invalid probability ({})", rec.probability));
    }
    if rec.odds.is_nan() || rec.odds <= 1.0 {
      errors.push(format!("{prefix}: Invalid odds ({})", rec.odds));
    }
    if rec.ev.is_nan() {
      errors.push(format!("{prefix}: Invalid EV (NaN)"));
    }
    if rec.stake < Decimal::ZERO || rec.stake_pct.is_nan() || rec.stake_pct < 0.0 {
      errors.push(format!("{prefix}: Invalid stake ({})", rec.stake));
    }

    if rec.ev > HIGH_EV && rec.level == Level::Avoid && rec.odds > HIGH_EV_MIN_ODDS {
      warnings.push(format!(
        "{prefix}: High EV ({:.4}) but marked {}. Check logic.",
        rec.ev, rec.level
      ));
    }
    if rec.ev < 0.0 && rec.level.is_recommended() {
      warnings.push(format!(
        "{prefix}: Negative EV ({:.4}) but level is {}.",
        rec.ev, rec.level
      ));
    }

    let stake = rec.stake.to_f64().unwrap_or(0.0);
    if bankroll > 0.0 && stake > bankroll * MAX_BANKROLL_SHARE {
      warnings.push(format!("{prefix}: Stake > 50% of bankroll."));
    }
  }

  ValidationReport {
    ok: errors.is_empty(),
    errors,
    warnings,
  }
}
