//! Odds normalization.
//!
//! Turns whatever a bookmaker page, a feed or an OCR pass produced into
//! canonical decimal odds. Accepts decimal, American, fractional,
//! percentage, Hong Kong / Malay style and OCR-garbled notations.
//! Every entry point is total: it returns `None` instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lowest decimal price accepted before clamping.
pub const MIN_RAW_ODDS: f64 = 1.0001;
/// Floor applied to every converted price.
pub const MIN_ODDS: f64 = 1.01;
/// Ceiling for decimal odds.
pub const MAX_ODDS: f64 = 10_000.0;

/// Optional hint about the notation of a raw price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFormat {
    Decimal,
    American,
    Fractional,
    Percentage,
    #[serde(alias = "hk")]
    HongKong,
}

/// Normalize a raw odds string: strip BOM, map unicode dashes and dots to
/// ASCII, drop whitespace, use `.` as decimal separator.
pub fn clean_text(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '\u{FEFF}' && !c.is_whitespace())
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2022}' | '\u{00B7}' | '\u{2219}' | ',' => '.',
            other => other,
        })
        .collect()
}

/// Suspended / locked market markers.
pub fn is_suspended(raw: &str) -> bool {
    let t = raw.trim().to_lowercase();
    matches!(
        t.as_str(),
        "-" | "\u{2014}" | "susp" | "suspended" | "lock" | "locked"
    ) || t.contains('\u{1F512}')
}

/// Repair OCR confusables (`o→0`, `i/l→1`, `s→5`).
///
/// Only applied when the token already carries a digit and every letter in
/// it is a known confusable, so words like "locked" are left alone.
fn repair_ocr(s: &str) -> String {
    let has_digit = s.chars().any(|c| c.is_ascii_digit());
    let only_confusables = s
        .chars()
        .filter(char::is_ascii_alphabetic)
        .all(|c| matches!(c, 'o' | 'O' | 'i' | 'l' | 's'));

    if !has_digit || !only_confusables {
        return s.to_string();
    }

    s.chars()
        .map(|c| match c {
            'o' | 'O' => '0',
            'i' | 'l' => '1',
            's' => '5',
            other => other,
        })
        .collect()
}

/// Parse a cleaned numeric string; non-finite results are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = clean_text(raw);
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric view of a JSON value (numbers or numeric strings).
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Implied percentage (e.g. 40 for 40%) to decimal odds.
pub fn pct_to_decimal(pct: f64) -> Option<f64> {
    let prob = pct / 100.0;
    if prob > 0.0 && prob < 1.0 {
        Some(1.0 / prob)
    } else {
        None
    }
}

/// American moneyline to decimal odds.
pub fn american_to_decimal(american: f64) -> Option<f64> {
    if !american.is_finite() || american == 0.0 {
        return None;
    }
    if american > 0.0 {
        Some(1.0 + american / 100.0)
    } else {
        Some(1.0 + 100.0 / american.abs())
    }
}

/// Fractional `a/b` to decimal odds.
pub fn fractional_to_decimal(s: &str) -> Option<f64> {
    let (num, den) = s.split_once('/')?;
    if !is_unsigned_decimal(num) || !is_unsigned_decimal(den) {
        return None;
    }
    let a: f64 = num.parse().ok()?;
    let b: f64 = den.parse().ok()?;
    if a < 0.0 || b <= 0.0 {
        return None;
    }
    Some(1.0 + a / b)
}

/// `\d+(\.\d+)?`
fn is_unsigned_decimal(s: &str) -> bool {
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    digits(int) && frac.is_none_or(digits)
}

/// `[+-]\d{2,5}`
fn is_american(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('+').or_else(|| s.strip_prefix('-')) else {
        return false;
    };
    (2..=5).contains(&rest.len()) && rest.bytes().all(|b| b.is_ascii_digit())
}

/// "250" → "2.50", "1250" → "12.50": prices whose decimal point got lost.
fn fix_likely_missing_decimal(s: &str) -> Option<f64> {
    if !(3..=4).contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: f64 = s.parse().ok()?;
    Some(n / 100.0)
}

/// Accept a converted price if it clears the raw floor, then clamp.
fn finalize(dec: Option<f64>) -> Option<f64> {
    dec.filter(|d| d.is_finite() && *d > MIN_RAW_ODDS)
        .map(|d| d.clamp(MIN_ODDS, MAX_ODDS))
}

/// Plain numeric odds: accepted iff finite and in `(1.0001, 10000]`,
/// returned untouched.
pub fn odds_from_f64(value: f64) -> Option<f64> {
    if !value.is_finite() || value <= MIN_RAW_ODDS || value > MAX_ODDS {
        return None;
    }
    Some(value)
}

/// Parse a raw odds string in any supported notation.
pub fn odds_from_str(raw: &str, hint: Option<OddsFormat>) -> Option<f64> {
    let cleaned = clean_text(raw);
    if cleaned.is_empty() || is_suspended(&cleaned) {
        return None;
    }

    let s = repair_ocr(&cleaned);
    if is_suspended(&s) {
        return None;
    }

    if let Some(pct) = s.strip_suffix('%') {
        return finalize(pct.parse::<f64>().ok().and_then(pct_to_decimal));
    }

    if s.contains('/') {
        return finalize(fractional_to_decimal(&s));
    }

    if is_american(&s) {
        return finalize(s.parse::<f64>().ok().and_then(american_to_decimal));
    }

    match hint {
        Some(OddsFormat::HongKong) => {
            if let Some(n) = s.parse::<f64>().ok().filter(|n| *n > 0.0) {
                return finalize(Some(1.0 + n));
            }
        }
        Some(OddsFormat::Percentage) => {
            return finalize(s.parse::<f64>().ok().and_then(pct_to_decimal));
        }
        _ => {}
    }

    let n = match fix_likely_missing_decimal(&s) {
        Some(fixed) => fixed,
        None => s.parse::<f64>().ok().filter(|n| n.is_finite())?,
    };

    let signed = s.starts_with('+') || s.starts_with('-');
    if signed && n != 0.0 && n.abs() <= 2.0 {
        // Malay / Indo style: negative → 1 + 1/|n|, positive → 1 + n
        let dec = if n < 0.0 { 1.0 + 1.0 / n.abs() } else { 1.0 + n };
        return finalize(Some(dec));
    }

    // net-odds style values below 1.01 (Hong Kong prices, stray probabilities)
    if n > 0.0 && n < MIN_ODDS {
        return Some((1.0 + n).clamp(MIN_ODDS, MAX_ODDS));
    }

    if !(MIN_RAW_ODDS..=MAX_ODDS).contains(&n) {
        return None;
    }
    Some(n.clamp(MIN_ODDS, MAX_ODDS))
}

/// Convert any raw odds value to decimal odds.
///
/// Objects prefer a numeric `decimal` field, then a string `decimal`, then a
/// string `raw`. Numbers go through [`odds_from_f64`], strings through
/// [`odds_from_str`].
pub fn convert_odds_to_decimal_auto(value: &Value, hint: Option<OddsFormat>) -> Option<f64> {
    match value {
        Value::Number(n) => odds_from_f64(n.as_f64()?),
        Value::String(s) => odds_from_str(s, hint),
        Value::Object(map) => match (map.get("decimal"), map.get("raw")) {
            (Some(Value::Number(n)), _) => n.as_f64().and_then(odds_from_f64),
            (Some(Value::String(s)), _) => odds_from_str(s, hint),
            (_, Some(Value::String(s))) => odds_from_str(s, hint),
            _ => None,
        },
        _ => None,
    }
}
