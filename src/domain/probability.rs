//! Probability helpers: implied probability, simplex normalization and
//! tolerant parsing of percent/decimal probability inputs.

use serde_json::Value;

use super::distributions::clamp01;
use super::odds::clean_text;

const EPS: f64 = 1e-12;

/// `1 / odds` for decimal odds above 1, else `None`.
pub fn calc_implied_prob(odds: f64) -> Option<f64> {
    if !odds.is_finite() || odds <= 1.0 {
        return None;
    }
    Some(1.0 / odds)
}

/// Normalize a vector onto the unit simplex.
///
/// Negative and non-finite entries count as 0. If the remaining mass is not
/// above 1e-12 the result is all zeros.
pub fn normalize_probs(probs: &[f64]) -> Vec<f64> {
    let cleaned: Vec<f64> = probs
        .iter()
        .map(|p| if p.is_finite() && *p > 0.0 { *p } else { 0.0 })
        .collect();

    let sum: f64 = cleaned.iter().sum();
    if sum <= EPS {
        return vec![0.0; cleaned.len()];
    }

    cleaned.into_iter().map(|p| p / sum).collect()
}

/// Numeric probability: values above 1 are read as percentages.
///
/// `1.0` stays 100% rather than 1%; the boundary is inherently ambiguous.
pub fn parse_prob_f64(val: f64) -> f64 {
    if !val.is_finite() {
        return 0.0;
    }
    clamp01(if val > 1.0 { val / 100.0 } else { val })
}

/// String probability: "55%", "0.55", ".55" and "55" all give 0.55.
pub fn parse_prob_str(val: &str) -> f64 {
    let s = clean_text(val);
    if s.is_empty() {
        return 0.0;
    }

    let has_percent = s.contains('%');
    let cleaned = s.replacen('%', "", 1);

    let Some(x) = cleaned.parse::<f64>().ok().filter(|x| x.is_finite()) else {
        return 0.0;
    };

    if has_percent {
        return clamp01(x / 100.0);
    }
    parse_prob_f64(x)
}

/// Probability from a JSON number or string; anything else is 0.
pub fn parse_prob(val: &Value) -> f64 {
    match val {
        Value::Number(n) => n.as_f64().map_or(0.0, parse_prob_f64),
        Value::String(s) => parse_prob_str(s),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_implied_prob() {
        assert_eq!(calc_implied_prob(2.0), Some(0.5));
        assert_eq!(calc_implied_prob(1.0), None);
        assert_eq!(calc_implied_prob(f64::NAN), None);
    }

    #[test]
    fn test_normalize_probs() {
        let out = normalize_probs(&[2.0, 3.0, 5.0]);
        assert!((out[0] - 0.2).abs() < 1e-12);
        assert!((out[1] - 0.3).abs() < 1e-12);
        assert!((out[2] - 0.5).abs() < 1e-12);
        assert_eq!(normalize_probs(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert_eq!(normalize_probs(&[-1.0, 1.0]), vec![0.0, 1.0]);
        assert!(normalize_probs(&[]).is_empty());
    }

    #[test]
    fn test_parse_prob_variants() {
        assert!((parse_prob(&json!(0.55)) - 0.55).abs() < 1e-12);
        assert!((parse_prob(&json!(55)) - 0.55).abs() < 1e-12);
        assert!((parse_prob(&json!("55%")) - 0.55).abs() < 1e-12);
        assert!((parse_prob(&json!(".55")) - 0.55).abs() < 1e-12);
        assert!((parse_prob(&json!("55")) - 0.55).abs() < 1e-12);
        assert!((parse_prob(&json!("0,55")) - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_parse_prob_boundaries() {
        assert_eq!(parse_prob(&json!(1)), 1.0);
        assert_eq!(parse_prob(&json!("1%")), 0.01);
        assert_eq!(parse_prob(&json!(250)), 1.0);
        assert_eq!(parse_prob(&json!(-0.2)), 0.0);
        assert_eq!(parse_prob(&Value::Null), 0.0);
        assert_eq!(parse_prob(&json!("n/a")), 0.0);
    }
}
