//! Kelly Criterion stake sizing.
//!
//! Full Kelly for decimal odds is `f* = (p·o − 1)/(o − 1)`, floored at 0.
//! The recommended stake is fractional Kelly (0.25x by default) with a hard
//! cap of 10% of bankroll.
//!
//! The free functions work in `f64` and degrade to 0 on bad input.
//! `KellyStaker` adds the bankroll amount in `Decimal`, rounded to cents.

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

use super::distributions::clamp01;

const EPS: f64 = 1e-12;

pub const DEFAULT_FRACTION: f64 = 0.25;
pub const DEFAULT_CAP: f64 = 0.10;

fn non_negative_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

/// Full Kelly fraction of bankroll. Never negative; 0 for odds ≤ 1.
pub fn calc_full_kelly(p: f64, odds: f64) -> f64 {
    if !p.is_finite() || !odds.is_finite() || odds <= 1.0 {
        return 0.0;
    }
    let p = clamp01(p);
    let b = odds - 1.0;
    if b <= EPS {
        return 0.0;
    }

    let f = p.mul_add(odds, -1.0) / b;
    if f > 0.0 { f } else { 0.0 }
}

/// `min(full · fraction, cap)`. Invalid knobs fall back to the defaults.
pub fn calc_fractional_kelly(full_kelly: f64, fraction: f64, cap: f64) -> f64 {
    let fk = non_negative_or(full_kelly, 0.0);
    let fr = non_negative_or(fraction, DEFAULT_FRACTION);
    let cp = non_negative_or(cap, DEFAULT_CAP);

    (fk * fr).min(cp).max(0.0)
}

/// `bankroll · stake_pct`, or 0 without a positive bankroll.
pub fn calc_stake_amount(stake_pct: f64, bankroll: f64) -> f64 {
    let s = non_negative_or(stake_pct, 0.0);
    if !bankroll.is_finite() || bankroll <= 0.0 {
        return 0.0;
    }
    bankroll * s
}

/// Sizing decision for one bet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StakeSizing {
    pub full_kelly: f64,
    /// Fraction of bankroll after the multiplier and cap.
    pub stake_pct: f64,
    /// Bankroll amount, rounded to 2dp.
    pub stake: Decimal,
}

/// Fractional Kelly calculator carrying the risk knobs.
#[derive(Debug, Clone)]
pub struct KellyStaker {
    /// Kelly fraction multiplier (0.25 = quarter-Kelly)
    fraction: f64,
    /// Maximum stake as fraction of bankroll
    cap: f64,
}

impl KellyStaker {
    pub fn new(fraction: f64, cap: f64) -> Self {
        Self {
            fraction: non_negative_or(fraction, DEFAULT_FRACTION),
            cap: non_negative_or(cap, DEFAULT_CAP),
        }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    /// Recommended fraction of bankroll for win probability `p` at `odds`.
    pub fn stake_pct(&self, p: f64, odds: f64) -> f64 {
        calc_fractional_kelly(calc_full_kelly(p, odds), self.fraction, self.cap)
    }

    /// Full sizing including the bankroll amount.
    pub fn size(&self, p: f64, odds: f64, bankroll: f64) -> StakeSizing {
        let full_kelly = calc_full_kelly(p, odds);
        let stake_pct = calc_fractional_kelly(full_kelly, self.fraction, self.cap);
        StakeSizing {
            full_kelly,
            stake_pct,
            stake: Self::stake_decimal(stake_pct, bankroll),
        }
    }

    /// Bankroll amount for `stake_pct`, in cents precision.
    pub fn stake_decimal(stake_pct: f64, bankroll: f64) -> Decimal {
        let amount = calc_stake_amount(stake_pct, bankroll);
        Decimal::from_f64(amount)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2)
            .max(Decimal::ZERO)
    }
}

impl Default for KellyStaker {
    /// Default: quarter-Kelly with a 10% cap.
    fn default() -> Self {
        Self {
            fraction: DEFAULT_FRACTION,
            cap: DEFAULT_CAP,
        }
    }
}
