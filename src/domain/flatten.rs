//! Odds flattening.
//!
//! Vendor feeds and screenshot extraction produce nested, inconsistently
//! keyed odds objects. [`flatten_odds`] maps them onto [`FlatOdds`], the one
//! schema the evaluator reads. Partial input gives a partial result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::odds::{convert_odds_to_decimal_auto, number_from_value};
use super::sport::Sport;

/// Canonical flat odds. Prices are decimal odds, lines are signed numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatOdds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_win: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_win: Option<f64>,
    #[serde(rename = "homeML", skip_serializing_if = "Option::is_none")]
    pub home_ml: Option<f64>,
    #[serde(rename = "awayML", skip_serializing_if = "Option::is_none")]
    pub away_ml: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_line: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_over: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_under: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread_line: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_spread: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_spread: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btts_yes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub btts_no: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ah_line: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ah_home: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ah_away: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corners_line: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corners_over: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corners_under: Option<f64>,
}

impl FlatOdds {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A line with its two prices, as found in `totals[]` / `spreads[]`.
#[derive(Debug, Clone, Copy, Default)]
struct LineQuote {
    line: Option<f64>,
    first: Option<f64>,
    second: Option<f64>,
}

fn price(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key)
        .and_then(|v| convert_odds_to_decimal_auto(v, None))
}

fn number(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(number_from_value)
}

/// First key carrying a valid price.
fn first_price(obj: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| price(obj, k))
}

/// First key carrying a number. Unlike a truthiness check, 0 is kept.
fn first_number(obj: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| number(obj, k))
}

fn quote_from(obj: &Value, first_key: &str, second_key: &str) -> LineQuote {
    LineQuote {
        line: number(obj, "line"),
        first: price(obj, first_key),
        second: price(obj, second_key),
    }
}

fn moneyline_source(raw: &Value) -> &Value {
    let ml = ["moneyline", "match_winner", "1x2", "match_result"]
        .iter()
        .find_map(|k| raw.get(k).filter(|v| is_truthy(v)))
        .unwrap_or(raw);

    match ml {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    }
}

fn is_truthy(v: &Value) -> bool {
    !matches!(v, Value::Null | Value::Bool(false))
}

fn pick_main_total(totals: &[Value], sport: Sport) -> Option<&Value> {
    let by_line = |pred: &dyn Fn(f64) -> bool| {
        totals
            .iter()
            .find(|t| number(t, "line").is_some_and(|l| pred(l)))
    };

    match sport {
        Sport::Football => by_line(&|l| (l - 2.5).abs() < f64::EPSILON)
            .or_else(|| totals.get(1))
            .or_else(|| totals.first()),
        Sport::Basketball => by_line(&|l| (170.0..=280.0).contains(&l)).or_else(|| totals.first()),
        _ => totals.first(),
    }
}

fn flatten_moneyline(raw: &Value, sport: Sport, flat: &mut FlatOdds) {
    let ml = moneyline_source(raw);
    let from_either = |key: &str| price(raw, key).or_else(|| price(ml, key));

    flat.home_win = from_either("homeWin");
    flat.draw = from_either("draw");
    flat.away_win = from_either("awayWin");

    let moneyline_sport = sport.is_moneyline_sport();
    if let Some(home_ml) = from_either("homeML") {
        flat.home_ml = Some(home_ml);
        if moneyline_sport {
            flat.home_win = Some(home_ml);
        }
    }
    if let Some(away_ml) = from_either("awayML") {
        flat.away_ml = Some(away_ml);
        if moneyline_sport {
            flat.away_win = Some(away_ml);
        }
    }

    if flat.home_win.is_some() || flat.home_ml.is_some() {
        return;
    }

    let home = first_price(ml, &["home", "1"]).or_else(|| price(raw, "1"));
    let draw = first_price(ml, &["draw", "X", "x"]).or_else(|| price(raw, "X"));
    let away = first_price(ml, &["away", "2"]).or_else(|| price(raw, "2"));

    if let (Some(home), Some(away)) = (home, away) {
        if moneyline_sport {
            flat.home_ml = Some(home);
            flat.away_ml = Some(away);
        } else {
            flat.home_win = Some(home);
            flat.away_win = Some(away);
            if draw.is_some() {
                flat.draw = draw;
            }
        }
    }
}

fn flatten_totals(raw: &Value, sport: Sport, flat: &mut FlatOdds) {
    let line = first_number(raw, &["line", "totalLine"]);
    let over = first_price(raw, &["over", "totalOver"]);
    let under = first_price(raw, &["under", "totalUnder"]);

    let main = match line {
        Some(_) if over.is_some() || under.is_some() => Some(LineQuote {
            line,
            first: over,
            second: under,
        }),
        _ => raw
            .get("totals")
            .and_then(Value::as_array)
            .and_then(|totals| pick_main_total(totals, sport))
            .map(|t| quote_from(t, "over", "under")),
    };

    if let Some(q) = main {
        flat.total_line = q.line;
        flat.total_over = q.first;
        flat.total_under = q.second;
    }
}

fn flatten_spread(raw: &Value, flat: &mut FlatOdds) {
    let line = first_number(raw, &["spreadLine", "handicapLine"]);
    let home = first_price(raw, &["homeSpread", "s1"]);
    let away = first_price(raw, &["awaySpread", "s2"]);

    let main = match line {
        Some(_) if home.is_some() || away.is_some() => Some(LineQuote {
            line,
            first: home,
            second: away,
        }),
        _ => raw
            .get("spreads")
            .and_then(Value::as_array)
            .and_then(|spreads| spreads.first())
            .map(|s| quote_from(s, "home", "away")),
    };

    if let Some(q) = main {
        flat.spread_line = q.line;
        flat.home_spread = q.first;
        flat.away_spread = q.second;
    }
}

fn flatten_btts(raw: &Value, flat: &mut FlatOdds) {
    let mut yes = price(raw, "bttsYes");
    let mut no = price(raw, "bttsNo");
    if yes.is_none() && no.is_none() {
        if let Some(btts) = raw.get("btts") {
            yes = first_price(btts, &["yes", "bttsYes"]);
            no = first_price(btts, &["no", "bttsNo"]);
        }
    }
    flat.btts_yes = yes;
    flat.btts_no = no;
}

fn flatten_asian_handicap(raw: &Value, flat: &mut FlatOdds) {
    let Some(ah) = raw
        .get("asian_handicap")
        .filter(|v| is_truthy(v))
        .or_else(|| raw.get("ah"))
    else {
        return;
    };
    flat.ah_line = number(ah, "line");
    flat.ah_home = price(ah, "home");
    flat.ah_away = price(ah, "away");
}

fn flatten_corners(raw: &Value, flat: &mut FlatOdds) {
    let line = number(raw, "cornersLine");
    let over = price(raw, "cornersOver");
    let under = price(raw, "cornersUnder");

    let quote = match line {
        Some(_) if over.is_some() || under.is_some() => LineQuote {
            line,
            first: over,
            second: under,
        },
        _ => match raw.get("corners").filter(|v| v.is_object()) {
            Some(corners) => quote_from(corners, "over", "under"),
            None => return,
        },
    };
    flat.corners_line = quote.line;
    flat.corners_over = quote.first;
    flat.corners_under = quote.second;
}

/// Flatten a raw odds object. Non-objects give an empty result.
pub fn flatten_odds(raw: &Value, sport: Sport) -> FlatOdds {
    let mut flat = FlatOdds::default();
    if !raw.is_object() {
        return flat;
    }

    flatten_moneyline(raw, sport, &mut flat);
    flatten_totals(raw, sport, &mut flat);
    flatten_spread(raw, &mut flat);
    flatten_btts(raw, &mut flat);
    flatten_asian_handicap(raw, &mut flat);
    flatten_corners(raw, &mut flat);
    flat
}
