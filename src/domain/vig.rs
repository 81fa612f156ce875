//! Overround removal.
//!
//! Turns a book of decimal odds into fair probabilities using either
//! multiplicative normalization or the power method (solve Σ pᵢⁿ = 1).
//! `Auto` picks power for ordinary markets and falls back to proportional
//! for very wide books, deep arbs and many-outcome markets.

use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-12;
const MIN_BOOK_ODDS: f64 = 1.000_000_1;
const MAX_OUTCOMES: usize = 60;

const NEWTON_MAX_ITER: u32 = 25;
const BISECT_MAX_ITER: u32 = 80;
const SOLVER_TOL: f64 = 1e-10;
const N_MIN: f64 = 0.05;
const N_MAX: f64 = 8.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VigMethod {
    #[default]
    Auto,
    Proportional,
    Power,
}

/// Fair book derived from a quoted book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VigRemoval {
    pub fair_probs: Vec<f64>,
    /// `NaN` where the fair probability is ~0.
    pub fair_odds: Vec<f64>,
    pub book_sum: f64,
    pub margin: f64,
    pub overround_pct: f64,
    pub is_arb: bool,
    pub method: VigMethod,
    /// Power exponent; 1.0 for proportional.
    pub alpha: f64,
    pub converged: bool,
    pub iterations: u32,
}

fn sanitize(odds: &[f64]) -> Vec<f64> {
    odds.iter()
        .copied()
        .filter(|o| o.is_finite() && *o > MIN_BOOK_ODDS)
        .take(MAX_OUTCOMES)
        .collect()
}

fn implied_book(odds: &[f64]) -> Option<(Vec<f64>, f64)> {
    let odds = sanitize(odds);
    if odds.len() < 2 {
        return None;
    }
    let implied: Vec<f64> = odds.iter().map(|o| 1.0 / o).collect();
    let sum: f64 = implied.iter().sum();
    if !sum.is_finite() || sum <= EPS {
        return None;
    }
    Some((implied, sum))
}

fn normalize(vec: &[f64]) -> Vec<f64> {
    let sum: f64 = vec.iter().sum();
    if !sum.is_finite() || sum <= EPS {
        return vec![0.0; vec.len()];
    }
    vec.iter().map(|v| v / sum).collect()
}

fn odds_from_probs(probs: &[f64]) -> Vec<f64> {
    probs
        .iter()
        .map(|p| if *p > EPS { 1.0 / p } else { f64::NAN })
        .collect()
}

fn build(
    fair_probs: Vec<f64>,
    book_sum: f64,
    method: VigMethod,
    alpha: f64,
    converged: bool,
    iterations: u32,
) -> VigRemoval {
    let margin = book_sum - 1.0;
    VigRemoval {
        fair_odds: odds_from_probs(&fair_probs),
        fair_probs,
        book_sum,
        margin,
        overround_pct: margin * 100.0,
        is_arb: book_sum < 1.0 - 1e-9,
        method,
        alpha,
        converged,
        iterations,
    }
}

/// Multiplicative normalization of the implied probabilities.
pub fn remove_vig_proportional(odds: &[f64]) -> Option<VigRemoval> {
    let (implied, sum) = implied_book(odds)?;
    let fair: Vec<f64> = implied.iter().map(|p| p / sum).collect();
    Some(build(fair, sum, VigMethod::Proportional, 1.0, true, 0))
}

/// f(n) = Σ pⁿ − 1 and f'(n) = Σ pⁿ ln p.
fn power_fn(implied: &[f64], n: f64) -> (f64, f64) {
    implied.iter().fold((-1.0, 0.0), |(f, df), &p| {
        let term = p.powf(n);
        let d = if p > EPS { term * p.ln() } else { 0.0 };
        (f + term, df + d)
    })
}

fn finalize_power(implied: &[f64], n: f64, sum: f64, converged: bool, iterations: u32) -> VigRemoval {
    let raw: Vec<f64> = implied.iter().map(|p| p.powf(n)).collect();
    build(normalize(&raw), sum, VigMethod::Power, n, converged, iterations)
}

/// Power method with guarded Newton and a bisection fallback.
pub fn remove_vig_power(odds: &[f64]) -> Option<VigRemoval> {
    let (implied, sum) = implied_book(odds)?;

    if (sum - 1.0).abs() < 1e-6 {
        return Some(build(normalize(&implied), sum, VigMethod::Power, 1.0, true, 0));
    }

    let mut n = 1.0_f64;
    let mut last_abs_f = f64::INFINITY;
    for it in 0..NEWTON_MAX_ITER {
        let (f, df) = power_fn(&implied, n);
        if !f.is_finite() || !df.is_finite() {
            break;
        }
        let abs_f = f.abs();
        if abs_f < SOLVER_TOL {
            return Some(finalize_power(&implied, n, sum, true, it + 1));
        }
        if abs_f > last_abs_f * 1.25 && it >= 2 {
            break;
        }
        last_abs_f = abs_f;

        if df.abs() < EPS {
            break;
        }
        let step = f / df;
        if !step.is_finite() {
            break;
        }
        n = (n - step).clamp(N_MIN, N_MAX);
    }

    let f_lo = power_fn(&implied, N_MIN).0;
    let f_hi = power_fn(&implied, N_MAX).0;
    if !(f_lo.is_finite() && f_hi.is_finite() && f_lo * f_hi <= 0.0) {
        return Some(finalize_power(&implied, n, sum, false, NEWTON_MAX_ITER));
    }

    let (mut lo, mut hi, mut f_lo) = (N_MIN, N_MAX, f_lo);
    let mut mid = 1.0;
    for i in 0..BISECT_MAX_ITER {
        mid = (lo + hi) / 2.0;
        let f_mid = power_fn(&implied, mid).0;
        if !f_mid.is_finite() {
            break;
        }
        if f_mid.abs() < SOLVER_TOL {
            return Some(finalize_power(&implied, mid, sum, true, NEWTON_MAX_ITER + i + 1));
        }
        if f_lo * f_mid <= 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    Some(finalize_power(
        &implied,
        mid,
        sum,
        false,
        NEWTON_MAX_ITER + BISECT_MAX_ITER,
    ))
}

/// Dispatch on `method`. `None` when fewer than two valid prices remain.
pub fn remove_vig(odds: &[f64], method: VigMethod) -> Option<VigRemoval> {
    let prop = remove_vig_proportional(odds)?;

    match method {
        VigMethod::Proportional => Some(prop),
        VigMethod::Power => Some(remove_vig_power(odds).unwrap_or(prop)),
        VigMethod::Auto => {
            if prop.fair_probs.len() > 10 || prop.margin > 0.20 || prop.margin < -0.05 {
                return Some(prop);
            }
            Some(remove_vig_power(odds).unwrap_or(prop))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(v: &[f64]) -> f64 {
        v.iter().sum()
    }

    #[test]
    fn test_proportional_two_way() {
        let r = remove_vig_proportional(&[1.91, 1.91]).unwrap();
        assert!((r.fair_probs[0] - 0.5).abs() < 1e-12);
        assert!((sum(&r.fair_probs) - 1.0).abs() < 1e-12);
        assert!(r.margin > 0.04);
        assert!(!r.is_arb);
    }

    #[test]
    fn test_power_converges_and_favors_favorite() {
        let odds = [1.5, 4.2, 6.5];
        let pow = remove_vig_power(&odds).unwrap();
        let prop = remove_vig_proportional(&odds).unwrap();
        assert!(pow.converged);
        assert!(pow.alpha > 1.0);
        assert!((sum(&pow.fair_probs) - 1.0).abs() < 1e-9);
        // power shifts margin toward longshots
        assert!(pow.fair_probs[0] > prop.fair_probs[0]);
        assert!(pow.fair_probs[2] < prop.fair_probs[2]);
    }

    #[test]
    fn test_fair_book_is_trivial() {
        let r = remove_vig_power(&[2.0, 2.0]).unwrap();
        assert_eq!(r.iterations, 0);
        assert_eq!(r.alpha, 1.0);
    }

    #[test]
    fn test_auto_uses_proportional_for_wide_books() {
        let r = remove_vig(&[1.3, 1.3], VigMethod::Auto).unwrap();
        assert_eq!(r.method, VigMethod::Proportional);

        let r = remove_vig(&[1.9, 1.9], VigMethod::Auto).unwrap();
        assert_eq!(r.method, VigMethod::Power);
    }

    #[test]
    fn test_arb_flag() {
        let r = remove_vig(&[2.2, 2.2], VigMethod::Proportional).unwrap();
        assert!(r.is_arb);
    }

    #[test]
    fn test_invalid_books() {
        assert!(remove_vig(&[2.0], VigMethod::Auto).is_none());
        assert!(remove_vig(&[1.0, f64::NAN, 2.0], VigMethod::Auto).is_none());
        assert!(remove_vig(&[], VigMethod::Power).is_none());
    }
}
