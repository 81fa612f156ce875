//! Expected value, edge and fair odds. All functions degrade to 0 on
//! invalid input instead of propagating `NaN`.

use super::distributions::clamp01;

const EPS: f64 = 1e-12;

fn safe_prob(p: f64) -> Option<f64> {
    p.is_finite().then(|| clamp01(p))
}

fn safe_odds(odds: f64) -> Option<f64> {
    (odds.is_finite() && odds > 1.0).then_some(odds)
}

/// Model probability minus implied probability.
pub fn calc_edge(p_model: f64, p_implied: f64) -> f64 {
    match (safe_prob(p_model), safe_prob(p_implied)) {
        (Some(pm), Some(pi)) => pm - pi,
        _ => 0.0,
    }
}

/// EV per unit stake: `p · odds − 1`.
pub fn calc_ev(p: f64, odds: f64) -> f64 {
    match (safe_prob(p), safe_odds(odds)) {
        (Some(p), Some(o)) => p.mul_add(o, -1.0),
        _ => 0.0,
    }
}

/// EV per unit stake when a push refunds the stake: `win · (odds − 1) − lose`.
pub fn calc_ev_with_push(win: f64, lose: f64, odds: f64) -> f64 {
    match (safe_prob(win), safe_prob(lose), safe_odds(odds)) {
        (Some(w), Some(l), Some(o)) => w.mul_add(o - 1.0, -l),
        _ => 0.0,
    }
}

pub fn implied_prob(odds: f64) -> f64 {
    safe_odds(odds).map_or(0.0, |o| 1.0 / o)
}

/// `1 / p`, or 0 when `p` is ~0.
pub fn fair_odds(p: f64) -> f64 {
    match safe_prob(p) {
        Some(p) if p > EPS => 1.0 / p,
        _ => 0.0,
    }
}

/// Signed percentage with one decimal, e.g. `+4.2%`.
pub fn format_ev(ev: f64) -> String {
    if !ev.is_finite() {
        return "0.0%".to_string();
    }
    let pct = ev * 100.0;
    let sign = if pct > 0.0 { "+" } else { "" };
    format!("{sign}{pct:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ev_identity() {
        assert!((calc_ev(0.55, 2.0) - 0.10).abs() < 1e-12);
        assert!((calc_ev(0.0, 3.0) + 1.0).abs() < 1e-12);
        assert_eq!(calc_ev(0.5, 1.0), 0.0);
        assert_eq!(calc_ev(f64::NAN, 2.0), 0.0);
    }

    #[test]
    fn test_ev_with_push() {
        // 45% win, 10% push, 45% lose at evens is break-even
        assert!(calc_ev_with_push(0.45, 0.45, 2.0).abs() < 1e-12);
        assert!((calc_ev_with_push(0.5, 0.5, 2.0) - calc_ev(0.5, 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_edge_and_fair_odds() {
        assert!((calc_edge(0.55, 0.5) - 0.05).abs() < 1e-12);
        assert_eq!(fair_odds(0.25), 4.0);
        assert_eq!(fair_odds(0.0), 0.0);
        assert_eq!(implied_prob(4.0), 0.25);
        assert_eq!(implied_prob(0.9), 0.0);
    }

    #[test]
    fn test_format_ev() {
        assert_eq!(format_ev(0.042), "+4.2%");
        assert_eq!(format_ev(-0.1), "-10.0%");
        assert_eq!(format_ev(0.0), "0.0%");
        assert_eq!(format_ev(f64::NAN), "0.0%");
    }
}
