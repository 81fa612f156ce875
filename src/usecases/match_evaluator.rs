//! Match Evaluator - Sport Model to Priced Recommendations
//!
//! Evaluation sequence for one match:
//! 1. Normalize the sport label and flatten the raw odds
//! 2. De-vig the match-winner book
//! 3. Fit the sport model from the projected inputs
//! 4. Price every quoted selection as win/push/lose, size it with
//!    fractional Kelly and grade it
//! 5. Validate the board; a board that fails validation is cleared
//!
//! Nothing here fails a batch: a bad match ends up with `errors` and no
//! recommendations.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::result_validator::validate_engine_result;
use crate::config::{EngineConfig, ModelsConfig};
use crate::domain::distributions::{SpreadProbs, TotalProbs, clamp01};
use crate::domain::ev::{calc_edge, calc_ev_with_push, fair_odds, implied_prob};
use crate::domain::kelly::KellyStaker;
use crate::domain::models::tennis::PlayerServeStats;
use crate::domain::models::{
  BaseballModel, BaseballProbs, BasketballModel, BasketballProbs, CornersModel, EpaInputs,
  FallbackInputs, FallbackProbs, FootballInputs, FootballModel, FootballProbs, HockeyInputs,
  HockeyModel, HockeyProbs, NflInputs, NflModel, NflProbs, PaceRatings, PitchingInputs,
  TennisInputs, TennisProbs, WeatherReport, calc_generic_probs, calc_tennis_probs,
};
use crate::domain::sanity::{BetValidationError, validate_bet_values};
use crate::domain::{
  ComboOptions, ComboResult, FlatOdds, Leg, Sport, VigMethod, VigRemoval, analyze_combo,
  flatten_odds, normalize_sport, remove_vig,
};

// Grading thresholds (EV per unit stake, stake as fraction of bankroll).
const GOOD_EV: f64 = 0.03;
const GOOD_STAKE: f64 = 0.01;
const STRONG_EV: f64 = 0.05;
const STRONG_STAKE: f64 = 0.02;

/// Projected scoring inputs. Each sport reads the fields it needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectedInputs {
  #[serde(alias = "homeXg", alias = "home_lambda")]
  pub home_xg: Option<f64>,
  #[serde(alias = "awayXg", alias = "away_lambda")]
  pub away_xg: Option<f64>,
  pub weather: Option<WeatherReport>,
  #[serde(alias = "homePoints")]
  pub home_points: Option<f64>,
  #[serde(alias = "awayPoints")]
  pub away_points: Option<f64>,
  #[serde(alias = "homeRuns")]
  pub home_runs: Option<f64>,
  #[serde(alias = "awayRuns")]
  pub away_runs: Option<f64>,
  /// Player 1 point-on-serve probability (0.68 or 68).
  #[serde(alias = "p1ServeHold")]
  pub p1_serve_hold: Option<f64>,
  #[serde(alias = "p2ServeHold")]
  pub p2_serve_hold: Option<f64>,
  /// Fallback model: market-implied home probability override.
  #[serde(alias = "impliedProb")]
  pub implied_prob: Option<f64>,
  pub skew: Option<f64>,
  pub confidence: Option<f64>,
  /// Football: Dixon–Coles rho override.
  pub rho: Option<f64>,
  #[serde(alias = "homeELO", alias = "homeElo")]
  pub home_elo: Option<f64>,
  #[serde(alias = "awayELO", alias = "awayElo")]
  pub away_elo: Option<f64>,
  /// Pieces of research behind the xG; more evidence, less Elo.
  #[serde(alias = "evidenceCount")]
  pub evidence_count: Option<usize>,
  #[serde(alias = "avgCornersHome")]
  pub home_corners: Option<f64>,
  #[serde(alias = "avgCornersAway")]
  pub away_corners: Option<f64>,
  /// Hockey possession share, first present wins: Corsi, Fenwick, xG.
  #[serde(alias = "homeCorsiShare")]
  pub home_corsi_share: Option<f64>,
  #[serde(alias = "homeFenwickShare")]
  pub home_fenwick_share: Option<f64>,
  #[serde(alias = "homeXGShare")]
  pub home_xg_share: Option<f64>,
  #[serde(alias = "homeGSAx")]
  pub home_gsax: Option<f64>,
  #[serde(alias = "awayGSAx")]
  pub away_gsax: Option<f64>,
  #[serde(flatten)]
  pub ratings: PaceRatings,
  #[serde(flatten)]
  pub efficiency: EpaInputs,
  #[serde(flatten)]
  pub pitching: PitchingInputs,
}

/// One match as submitted to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchInput {
  #[serde(default)]
  pub id: Option<String>,
  #[serde(default)]
  pub sport: String,
  #[serde(default = "default_home", alias = "team_1")]
  pub home_team: String,
  #[serde(default = "default_away", alias = "team_2")]
  pub away_team: String,
  /// Raw odds in any of the supported shapes.
  #[serde(default)]
  pub odds: Value,
  #[serde(default, alias = "extractedParameters")]
  pub params: ProjectedInputs,
}

fn default_home() -> String {
  "Home".to_string()
}

fn default_away() -> String {
  "Away".to_string()
}

impl MatchInput {
  pub fn new(sport: &str, home_team: &str, away_team: &str) -> Self {
    Self {
      id: None,
      sport: sport.to_string(),
      home_team: home_team.to_string(),
      away_team: away_team.to_string(),
      odds: Value::Null,
      params: ProjectedInputs::default(),
    }
  }

  #[must_use]
  pub fn with_id(mut self, id: impl Into<String>) -> Self {
    self.id = Some(id.into());
    self
  }

  #[must_use]
  pub fn with_odds(mut self, odds: Value) -> Self {
    self.odds = odds;
    self
  }

  #[must_use]
  pub fn with_params(mut self, params: ProjectedInputs) -> Self {
    self.params = params;
    self
  }

  fn explicit_id(&self) -> Option<String> {
    self
      .id
      .as_deref()
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .map(str::to_string)
  }
}

/// Market a recommendation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
  /// Regulation 1X2.
  MatchResult,
  /// Two-way winner, overtime included.
  Moneyline,
  Total,
  Spread,
  Btts,
  AsianHandicap,
  Corners,
}

impl Market {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::MatchResult => "match_result",
      Self::Moneyline => "moneyline",
      Self::Total => "total",
      Self::Spread => "spread",
      Self::Btts => "btts",
      Self::AsianHandicap => "asian_handicap",
      Self::Corners => "corners",
    }
  }
}

impl fmt::Display for Market {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Recommendation grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
  Avoid,
  Lean,
  Good,
  Strong,
}

impl Level {
  /// Grade from EV and the sized stake. Anything under `min_ev` is avoided.
  pub fn grade(ev: f64, stake_pct: f64, min_ev: f64) -> Self {
    if ev.is_nan() || ev <= 0.0 || ev < min_ev || stake_pct.is_nan() || stake_pct <= 0.0 {
      Self::Avoid
    } else if ev >= STRONG_EV && stake_pct >= STRONG_STAKE {
      Self::Strong
    } else if ev >= GOOD_EV && stake_pct >= GOOD_STAKE {
      Self::Good
    } else {
      Self::Lean
    }
  }

  pub fn is_recommended(self) -> bool {
    self != Self::Avoid
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Avoid => "AVOID",
      Self::Lean => "LEAN",
      Self::Good => "GOOD",
      Self::Strong => "STRONG",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One priced selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
  pub market: Market,
  pub selection: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub line: Option<f64>,
  pub odds: f64,
  /// Model probability that the selection wins outright.
  pub probability: f64,
  /// Probability the stake is refunded.
  pub push: f64,
  /// `win / (win + lose)`: the probability Kelly is sized on.
  pub decisive_prob: f64,
  pub implied_prob: f64,
  /// Expected profit per unit stake, push refunded.
  pub ev: f64,
  pub edge: f64,
  pub fair_odds: f64,
  pub full_kelly: f64,
  pub stake_pct: f64,
  pub stake: Decimal,
  pub level: Level,
}

/// Evaluation output for one match.
#[derive(Debug, Clone, Serialize)]
pub struct EngineResult {
  pub match_id: String,
  pub sport: Sport,
  pub home_team: String,
  pub away_team: String,
  pub odds: FlatOdds,
  /// Serialized model output (probabilities and diagnostics).
  pub model: Value,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub market_vig: Option<VigRemoval>,
  pub recommendations: Vec<Recommendation>,
  pub warnings: Vec<String>,
  pub errors: Vec<String>,
}

impl EngineResult {
  fn new(match_id: String, sport: Sport, input: &MatchInput, odds: FlatOdds) -> Self {
    Self {
      match_id,
      sport,
      home_team: input.home_team.clone(),
      away_team: input.away_team.clone(),
      odds,
      model: Value::Null,
      market_vig: None,
      recommendations: Vec::new(),
      warnings: Vec::new(),
      errors: Vec::new(),
    }
  }

  pub fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }

  /// Recommendations graded above `Avoid`.
  pub fn recommended(&self) -> impl Iterator<Item = &Recommendation> {
    self.recommendations.iter().filter(|r| r.level.is_recommended())
  }

  /// Highest-EV recommended selection.
  pub fn best(&self) -> Option<&Recommendation> {
    self.recommended().max_by(|a, b| a.ev.total_cmp(&b.ev))
  }
}

/// Win/push/lose for one selection.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Outcome {
  win: f64,
  push: f64,
  lose: f64,
}

impl Outcome {
  fn binary(p: f64) -> Self {
    Self {
      win: p,
      push: 0.0,
      lose: 1.0 - p,
    }
  }

  fn cover(s: SpreadProbs) -> Self {
    Self {
      win: s.cover,
      push: s.push,
      lose: s.no_cover,
    }
  }

  fn no_cover(s: SpreadProbs) -> Self {
    Self {
      win: s.no_cover,
      push: s.push,
      lose: s.cover,
    }
  }

  fn over(t: TotalProbs) -> Self {
    Self {
      win: t.over,
      push: t.push,
      lose: t.under,
    }
  }

  fn under(t: TotalProbs) -> Self {
    Self {
      win: t.under,
      push: t.push,
      lose: t.over,
    }
  }
}

struct WinnerOutcomes {
  home: Outcome,
  draw: Option<Outcome>,
  away: Outcome,
}

/// Match-winner prices as the evaluator reads them.
struct WinnerBook {
  three_way: bool,
  home: Option<f64>,
  draw: Option<f64>,
  away: Option<f64>,
}

impl WinnerBook {
  /// Football is always 1X2. Hockey is the regulation 1X2 whenever a draw
  /// is quoted, whichever keys carried the side prices; otherwise the pair
  /// is the OT-inclusive moneyline.
  fn read(sport: Sport, odds: &FlatOdds) -> Self {
    let three_way = match sport {
      Sport::Football => true,
      Sport::Hockey => odds.draw.is_some(),
      _ => false,
    };

    if three_way {
      Self {
        three_way,
        home: odds.home_win.or(odds.home_ml),
        draw: odds.draw,
        away: odds.away_win.or(odds.away_ml),
      }
    } else {
      Self {
        three_way,
        home: odds.home_ml.or(odds.home_win),
        draw: None,
        away: odds.away_ml.or(odds.away_win),
      }
    }
  }

  fn prices(&self) -> Option<Vec<f64>> {
    match (self.home, self.draw, self.away) {
      (Some(h), Some(d), Some(a)) if self.three_way => Some(vec![h, d, a]),
      (Some(h), _, Some(a)) if !self.three_way => Some(vec![h, a]),
      _ => None,
    }
  }
}

/// Fitted model for one match.
enum FittedModel {
  Football(FootballModel, FootballProbs, CornersModel),
  Hockey(HockeyModel, HockeyProbs),
  Basketball(BasketballModel, BasketballProbs),
  Nfl(NflModel, NflProbs),
  Baseball(BaseballModel, BaseballProbs),
  Tennis(TennisProbs),
  Fallback(FallbackProbs),
}

impl FittedModel {
  fn summary(&self) -> Value {
    let value = match self {
      Self::Football(_, p, _) => serde_json::to_value(p),
      Self::Hockey(_, p) => serde_json::to_value(p),
      Self::Basketball(_, p) => serde_json::to_value(p),
      Self::Nfl(_, p) => serde_json::to_value(p),
      Self::Baseball(_, p) => serde_json::to_value(p),
      Self::Tennis(p) => serde_json::to_value(p),
      Self::Fallback(p) => serde_json::to_value(p),
    };
    value.unwrap_or_default()
  }

  fn winner(&self, three_way: bool) -> WinnerOutcomes {
    let two_way = |home: f64, away: f64| WinnerOutcomes {
      home: Outcome::binary(home),
      draw: None,
      away: Outcome::binary(away),
    };

    match self {
      Self::Football(_, p, _) => WinnerOutcomes {
        home: Outcome::binary(p.home_win),
        draw: Some(Outcome::binary(p.draw)),
        away: Outcome::binary(p.away_win),
      },
      Self::Hockey(_, p) if three_way => WinnerOutcomes {
        home: Outcome::binary(p.home_win_reg),
        draw: Some(Outcome::binary(p.draw_reg)),
        away: Outcome::binary(p.away_win_reg),
      },
      Self::Hockey(_, p) => two_way(p.home_win_ot, p.away_win_ot),
      Self::Basketball(_, p) => two_way(p.home_win, p.away_win),
      // A tie refunds a two-way moneyline.
      Self::Nfl(_, p) => WinnerOutcomes {
        home: Outcome {
          win: p.home_win,
          push: p.tie,
          lose: p.away_win,
        },
        draw: None,
        away: Outcome {
          win: p.away_win,
          push: p.tie,
          lose: p.home_win,
        },
      },
      Self::Baseball(_, p) => two_way(p.home_win, p.away_win),
      Self::Tennis(p) => two_way(p.p1_win, p.p2_win),
      Self::Fallback(p) => two_way(p.win, p.loss),
    }
  }

  fn totals(&self, line: f64) -> Option<TotalProbs> {
    match self {
      Self::Football(m, _, _) => Some(m.total_probs(line)),
      Self::Hockey(m, _) => Some(m.total_probs(line)),
      Self::Basketball(m, _) => Some(m.total_probs(line)),
      Self::Nfl(m, _) if m.has_total() => Some(m.total_probs(line)),
      Self::Nfl(..) => None,
      Self::Baseball(m, _) => Some(m.total_probs(line)),
      Self::Tennis(_) | Self::Fallback(_) => None,
    }
  }

  fn spread(&self, home_line: f64) -> Option<SpreadProbs> {
    match self {
      Self::Football(m, _, _) => Some(m.handicap_probs(home_line)),
      Self::Hockey(m, _) => Some(m.handicap_probs(home_line)),
      Self::Basketball(m, _) => Some(m.spread_probs(home_line)),
      Self::Nfl(m, _) => Some(m.spread_probs(home_line)),
      Self::Baseball(m, _) => Some(m.runline_probs(home_line)),
      Self::Tennis(_) | Self::Fallback(_) => None,
    }
  }

  fn btts(&self) -> Option<(f64, f64)> {
    match self {
      Self::Football(_, p, _) => Some((p.btts_yes, p.btts_no)),
      _ => None,
    }
  }

  fn corners(&self, line: f64) -> Option<TotalProbs> {
    match self {
      Self::Football(_, _, c) => Some(c.total_probs(line)),
      _ => None,
    }
  }
}

/// `.25` / `.75` lines settle as two half stakes, which is not priced here.
fn is_quarter_line(line: f64) -> bool {
  let quarters = line * 4.0;
  let rounded = quarters.round();
  (quarters - rounded).abs() < 1e-9 && (rounded as i64).rem_euclid(2) == 1
}

fn signed_line(line: f64) -> String {
  format!("{line:+}")
}

/// Evaluates matches against a fixed engine configuration.
#[derive(Debug, Clone)]
pub struct MatchEvaluator {
  staker: KellyStaker,
  bankroll: f64,
  min_ev: f64,
  vig_method: VigMethod,
  combo: ComboOptions,
  models: ModelsConfig,
}

impl MatchEvaluator {
  /// Create an evaluator from config.
  pub fn new(config: &EngineConfig) -> Self {
    Self {
      staker: KellyStaker::new(config.staking.kelly_fraction, config.staking.kelly_cap),
      bankroll: config.engine.bankroll,
      min_ev: config.staking.min_ev,
      vig_method: config.vig.method,
      combo: config.combo.options(),
      models: config.models.clone(),
    }
  }

  pub fn bankroll(&self) -> f64 {
    self.bankroll
  }

  /// Evaluate a slate. Results are keyed by match id, or `match_{index}`
  /// when the input has none.
  pub fn evaluate_batch(&self, matches: &[MatchInput]) -> BTreeMap<String, EngineResult> {
    let mut results = BTreeMap::new();

    for (i, input) in matches.iter().enumerate() {
      let base = input.explicit_id().unwrap_or_else(|| format!("match_{i}"));
      let key = free_key(&results, base, i);
      let result = self.evaluate_as(key.clone(), input);
      results.insert(key, result);
    }

    let failed = results.values().filter(|r| !r.is_ok()).count();
    let recommended: usize = results.values().map(|r| r.recommended().count()).sum();
    info!(
      matches = matches.len(),
      recommended,
      failed,
      "Batch evaluated"
    );

    results
  }

  /// Evaluate a single match.
  pub fn evaluate(&self, input: &MatchInput) -> EngineResult {
    let id = input.explicit_id().unwrap_or_else(|| "match_0".to_string());
    self.evaluate_as(id, input)
  }

  /// Combine legs with the configured correlation handling.
  pub fn analyze_combo(&self, legs: &[Leg]) -> ComboResult {
    analyze_combo(legs, &self.combo)
  }

  /// Legs built from the best selection of each clean result.
  pub fn best_legs<'a>(results: impl IntoIterator<Item = &'a EngineResult>) -> Vec<Leg> {
    results
      .into_iter()
      .filter_map(|r| {
        r.best()
          .map(|rec| Leg::new(rec.odds, rec.probability).with_match(r.match_id.clone()))
      })
      .collect()
  }

  fn evaluate_as(&self, match_id: String, input: &MatchInput) -> EngineResult {
    let sport = normalize_sport(&input.sport);
    let odds = flatten_odds(&input.odds, sport);
    let mut result = EngineResult::new(match_id, sport, input, odds);

    if result.odds.is_empty() {
      result.warnings.push("No usable odds; nothing to price.".to_string());
    }

    let book = WinnerBook::read(sport, &result.odds);
    result.market_vig = book
      .prices()
      .and_then(|prices| remove_vig(&prices, self.vig_method));

    let model = match self.fit(sport, input, result.market_vig.as_ref(), &mut result.warnings) {
      Ok(model) => model,
      Err(e) => {
        warn!(match_id = %result.match_id, sport = %sport, error = %e, "Model fit failed");
        result.errors.push(e);
        return result;
      }
    };
    result.model = model.summary();

    self.price_winner(&model, &book, input, &mut result);
    self.price_totals(&model, &mut result);
    self.price_spread(&model, input, &mut result);
    self.price_asian_handicap(&model, input, &mut result);
    self.price_btts(&model, &mut result);
    self.price_corners(&model, &mut result);

    let report = validate_engine_result(&result, self.bankroll);
    result.warnings.extend(report.warnings);
    if !report.ok {
      warn!(
        match_id = %result.match_id,
        errors = report.errors.len(),
        "Engine result failed validation"
      );
      result.errors.extend(report.errors);
      result.recommendations.clear();
    }

    debug!(
      match_id = %result.match_id,
      sport = %sport,
      priced = result.recommendations.len(),
      recommended = result.recommended().count(),
      warnings = result.warnings.len(),
      "Match evaluated"
    );

    result
  }

  fn fit(
    &self,
    sport: Sport,
    input: &MatchInput,
    market_vig: Option<&VigRemoval>,
    warnings: &mut Vec<String>,
  ) -> Result<FittedModel, String> {
    let p = &input.params;

    match sport {
      Sport::Football => {
        let (h, a) = xg_or_default(p, warnings);
        let base = self.models.football(h, a);
        let elo = match (p.home_elo, p.away_elo) {
          (Some(home), Some(away)) => {
            self.models.elo(home, away, p.evidence_count.unwrap_or(0))
          }
          _ => None,
        };
        let inputs = FootballInputs {
          weather: p.weather.clone(),
          rho: p.rho.filter(|r| r.is_finite() && r.abs() < 1.0).unwrap_or(base.rho),
          elo,
          ..base
        };
        let model = FootballModel::fit(&inputs);
        let probs = model.probs(false);
        let corners = CornersModel::fit(&self.models.corners(p.home_corners, p.away_corners));
        Ok(FittedModel::Football(model, probs, corners))
      }
      Sport::Hockey => {
        let (h, a) = xg_or_default(p, warnings);
        let inputs = HockeyInputs {
          home_share: p.home_corsi_share.or(p.home_fenwick_share).or(p.home_xg_share),
          home_gsax: p.home_gsax.unwrap_or(0.0),
          away_gsax: p.away_gsax.unwrap_or(0.0),
          ..self.models.hockey(h, a)
        };
        let model = HockeyModel::fit(&inputs);
        let probs = model.probs(false);
        Ok(FittedModel::Hockey(model, probs))
      }
      Sport::Basketball => {
        let (h, a) = match (p.home_points, p.away_points) {
          (None, None) if !p.ratings.is_empty() => p.ratings.project(),
          (home, away) => required_pair(sport, "points", home, away)?,
        };
        let model = BasketballModel::fit(&self.models.basketball(h, a));
        Ok(FittedModel::Basketball(model, model.probs()))
      }
      Sport::AmericanFootball => {
        let inputs = self.models.nfl(f64::NAN, f64::NAN);
        let model = match (p.home_points, p.away_points) {
          (None, None) if p.efficiency.has_efficiency() => {
            let proj = p
              .efficiency
              .project(self.models.nfl_plays_per_team, self.models.nfl_hfa);
            if proj.adj_capped {
              warnings.push(format!(
                "Situational adjustment capped at {:+} points.",
                proj.adj_points
              ));
            }
            match proj.total {
              Some(total) => NflModel::fit(&NflInputs {
                home_points: (total + proj.margin) / 2.0,
                away_points: (total - proj.margin) / 2.0,
                ..inputs
              }),
              None => NflModel::fit_margin(proj.margin, &inputs),
            }
          }
          (home, away) => {
            let (h, a) = required_pair(sport, "points", home, away)?;
            NflModel::fit(&NflInputs {
              home_points: h,
              away_points: a,
              ..inputs
            })
          }
        };
        Ok(FittedModel::Nfl(model, model.probs()))
      }
      Sport::Baseball => {
        let home = p.home_runs.or(p.home_points);
        let away = p.away_runs.or(p.away_points);
        let (h, a) = match (home, away) {
          (None, None) if !p.pitching.is_empty() => {
            p.pitching.project(&self.models.run_environment())
          }
          (home, away) => required_pair(sport, "runs", home, away)?,
        };
        let model = BaseballModel::fit(&self.models.baseball(h, a));
        Ok(FittedModel::Baseball(model, model.probs()))
      }
      Sport::Tennis => {
        if p.p1_serve_hold.is_none() || p.p2_serve_hold.is_none() {
          warnings.push("Missing serve stats; using the default hold rate.".to_string());
        }
        let inputs = TennisInputs {
          p1: PlayerServeStats {
            serve_hold: p.p1_serve_hold,
          },
          p2: PlayerServeStats {
            serve_hold: p.p2_serve_hold,
          },
        };
        Ok(FittedModel::Tennis(calc_tennis_probs(&inputs)))
      }
      Sport::Esports | Sport::Combat | Sport::Other => {
        warnings.push(format!(
          "No dedicated model for {sport}; using the market-implied fallback."
        ));
        let implied_prob = p
          .implied_prob
          .or_else(|| market_vig.and_then(|v| v.fair_probs.first().copied()));
        let inputs = FallbackInputs {
          implied_prob,
          skew: p.skew.unwrap_or(0.0),
          confidence: p.confidence,
        };
        Ok(FittedModel::Fallback(calc_generic_probs(&inputs)))
      }
    }
  }

  fn price_winner(
    &self,
    model: &FittedModel,
    book: &WinnerBook,
    input: &MatchInput,
    result: &mut EngineResult,
  ) {
    let market = if book.three_way {
      Market::MatchResult
    } else {
      Market::Moneyline
    };
    let outcomes = model.winner(book.three_way);

    self.add(result, market, &input.home_team, None, book.home, outcomes.home);
    if let Some(draw) = outcomes.draw {
      self.add(result, market, "Draw", None, book.draw, draw);
    }
    self.add(result, market, &input.away_team, None, book.away, outcomes.away);
  }

  fn price_totals(&self, model: &FittedModel, result: &mut EngineResult) {
    let (over, under) = (result.odds.total_over, result.odds.total_under);
    let Some(line) = market_line(Market::Total, result.odds.total_line, over.or(under), result)
    else {
      return;
    };
    let Some(t) = model.totals(line) else {
      result.warnings.push(unsupported(Market::Total, result.sport));
      return;
    };

    self.add(result, Market::Total, &format!("Over {line}"), Some(line), over, Outcome::over(t));
    self.add(result, Market::Total, &format!("Under {line}"), Some(line), under, Outcome::under(t));
  }

  fn price_spread(&self, model: &FittedModel, input: &MatchInput, result: &mut EngineResult) {
    let (home, away) = (result.odds.home_spread, result.odds.away_spread);
    let Some(line) = market_line(Market::Spread, result.odds.spread_line, home.or(away), result)
    else {
      return;
    };
    self.price_handicap(model, Market::Spread, line, home, away, input, result);
  }

  fn price_asian_handicap(
    &self,
    model: &FittedModel,
    input: &MatchInput,
    result: &mut EngineResult,
  ) {
    let (home, away) = (result.odds.ah_home, result.odds.ah_away);
    let Some(line) = market_line(Market::AsianHandicap, result.odds.ah_line, home.or(away), result)
    else {
      return;
    };
    self.price_handicap(model, Market::AsianHandicap, line, home, away, input, result);
  }

  #[allow(clippy::too_many_arguments)]
  fn price_handicap(
    &self,
    model: &FittedModel,
    market: Market,
    home_line: f64,
    home_odds: Option<f64>,
    away_odds: Option<f64>,
    input: &MatchInput,
    result: &mut EngineResult,
  ) {
    let Some(s) = model.spread(home_line) else {
      result.warnings.push(unsupported(market, result.sport));
      return;
    };

    let away_line = 0.0 - home_line;
    let home_sel = format!("{} {}", input.home_team, signed_line(home_line));
    let away_sel = format!("{} {}", input.away_team, signed_line(away_line));
    self.add(result, market, &home_sel, Some(home_line), home_odds, Outcome::cover(s));
    self.add(result, market, &away_sel, Some(away_line), away_odds, Outcome::no_cover(s));
  }

  fn price_btts(&self, model: &FittedModel, result: &mut EngineResult) {
    let (yes, no) = (result.odds.btts_yes, result.odds.btts_no);
    if yes.is_none() && no.is_none() {
      return;
    }
    let Some((p_yes, p_no)) = model.btts() else {
      result.warnings.push(unsupported(Market::Btts, result.sport));
      return;
    };

    self.add(result, Market::Btts, "Yes", None, yes, Outcome::binary(p_yes));
    self.add(result, Market::Btts, "No", None, no, Outcome::binary(p_no));
  }

  fn price_corners(&self, model: &FittedModel, result: &mut EngineResult) {
    let (over, under) = (result.odds.corners_over, result.odds.corners_under);
    let Some(line) = market_line(Market::Corners, result.odds.corners_line, over.or(under), result)
    else {
      return;
    };
    let Some(t) = model.corners(line) else {
      result.warnings.push(unsupported(Market::Corners, result.sport));
      return;
    };

    let (over_sel, under_sel) = (format!("Over {line}"), format!("Under {line}"));
    self.add(result, Market::Corners, &over_sel, Some(line), over, Outcome::over(t));
    self.add(result, Market::Corners, &under_sel, Some(line), under, Outcome::under(t));
  }

  /// Price one quoted selection; unquoted selections are skipped and
  /// rejected ones become warnings.
  fn add(
    &self,
    result: &mut EngineResult,
    market: Market,
    selection: &str,
    line: Option<f64>,
    odds: Option<f64>,
    outcome: Outcome,
  ) {
    let Some(odds) = odds else {
      return;
    };
    match self.price(market, selection, line, odds, outcome) {
      Ok(rec) => result.recommendations.push(rec),
      Err(e) => result.warnings.push(format!("{market} {selection}: {e}")),
    }
  }

  fn price(
    &self,
    market: Market,
    selection: &str,
    line: Option<f64>,
    odds: f64,
    outcome: Outcome,
  ) -> Result<Recommendation, BetValidationError> {
    let bet = validate_bet_values(odds, outcome.win)?;
    let win = bet.p;
    let push = clamp01(outcome.push);
    let lose = clamp01(outcome.lose);

    let ev = calc_ev_with_push(win, lose, bet.odds);
    let decisive_prob = if win + lose > 0.0 { win / (win + lose) } else { 0.0 };
    let implied = implied_prob(bet.odds);

    let sizing = self.staker.size(decisive_prob, bet.odds, self.bankroll);
    let level = Level::grade(ev, sizing.stake_pct, self.min_ev);
    let (stake_pct, stake) = if level.is_recommended() {
      (sizing.stake_pct, sizing.stake)
    } else {
      (0.0, Decimal::ZERO)
    };

    Ok(Recommendation {
      market,
      selection: selection.to_string(),
      line,
      odds: bet.odds,
      probability: win,
      push,
      decisive_prob,
      implied_prob: implied,
      ev,
      edge: calc_edge(decisive_prob, implied),
      fair_odds: fair_odds(decisive_prob),
      full_kelly: sizing.full_kelly,
      stake_pct,
      stake,
      level,
    })
  }
}

fn xg_or_default(p: &ProjectedInputs, warnings: &mut Vec<String>) -> (f64, f64) {
  if p.home_xg.is_none() || p.away_xg.is_none() {
    warnings.push("Missing projected xG; using league defaults.".to_string());
  }
  (p.home_xg.unwrap_or(f64::NAN), p.away_xg.unwrap_or(f64::NAN))
}

/// `base` if unused, else the first free `{base}_{n}` counting up from the
/// batch index.
fn free_key(results: &BTreeMap<String, EngineResult>, base: String, index: usize) -> String {
  let mut key = base.clone();
  let mut n = index;
  while results.contains_key(&key) {
    key = format!("{base}_{n}");
    n += 1;
  }
  key
}

fn required_pair(
  sport: Sport,
  what: &str,
  home: Option<f64>,
  away: Option<f64>,
) -> Result<(f64, f64), String> {
  match (home, away) {
    (Some(h), Some(a)) if h.is_finite() && a.is_finite() => Ok((h, a)),
    _ => Err(format!("Missing projected {what} for {sport}.")),
  }
}

/// Usable line for a quoted market, or `None` with a warning.
fn market_line(
  market: Market,
  line: Option<f64>,
  any_price: Option<f64>,
  result: &mut EngineResult,
) -> Option<f64> {
  any_price?;
  let Some(line) = line.filter(|l| l.is_finite()) else {
    result.warnings.push(format!("{market} prices without a line."));
    return None;
  };
  if is_quarter_line(line) {
    result.warnings.push(format!(
      "{market} line {line} is a quarter line; split-stake settlement is not supported."
    ));
    return None;
  }
  Some(line)
}

fn unsupported(market: Market, sport: Sport) -> String {
  format!("{market} market is not modeled for {sport}.")
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn evaluator() -> MatchEvaluator {
    MatchEvaluator::new(&EngineConfig::default())
  }

  fn football_match() -> MatchInput {
    MatchInput::new("Soccer", "Arsenal", "Chelsea")
      .with_id("epl-1")
      .with_odds(json!({
        "homeWin": 2.10,
        "draw": 3.40,
        "awayWin": 3.80,
        "totals": [{ "line": 2.5, "over": 1.95, "under": 1.90 }],
        "btts": { "yes": 1.80, "no": 2.00 }
      }))
      .with_params(ProjectedInputs {
        home_xg: Some(1.8),
        away_xg: Some(1.0),
        ..ProjectedInputs::default()
      })
  }

  fn assert_graded_consistently(result: &EngineResult) {
    for rec in &result.recommendations {
      if rec.level.is_recommended() {
        assert!(rec.ev > 0.0, "{} graded {} with ev {}", rec.selection, rec.level, rec.ev);
        assert!(rec.stake > Decimal::ZERO);
      } else {
        assert_eq!(rec.stake, Decimal::ZERO);
        assert_eq!(rec.stake_pct, 0.0);
      }
    }
  }

  #[test]
  fn test_football_board() {
    let result = evaluator().evaluate(&football_match());
    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(result.match_id, "epl-1");
    assert_eq!(result.sport, Sport::Football);
    // 1X2 + over/under + btts yes/no
    assert_eq!(result.recommendations.len(), 7);

    let winner: f64 = result
      .recommendations
      .iter()
      .filter(|r| r.market == Market::MatchResult)
      .map(|r| r.probability)
      .sum();
    assert!((winner - 1.0).abs() < 1e-6);

    let vig = result.market_vig.as_ref().unwrap();
    assert_eq!(vig.fair_probs.len(), 3);
    assert!(vig.margin > 0.0);

    assert!(result.model["home_win"].as_f64().unwrap() > 0.5);
    assert_graded_consistently(&result);
  }

  #[test]
  fn test_home_favourite_value_is_recommended() {
    // xG 1.8 vs 1.0 puts the home side near 55%; 2.10 is generous.
    let result = evaluator().evaluate(&football_match());
    let home = result
      .recommendations
      .iter()
      .find(|r| r.selection == "Arsenal")
      .unwrap();
    assert!(home.ev > 0.0);
    assert_eq!(home.level, Level::Strong);
    assert!(result.best().is_some());
  }

  #[test]
  fn test_missing_points_is_error_not_panic() {
    let input = MatchInput::new("NBA", "Celtics", "Heat")
      .with_odds(json!({ "homeML": 1.70, "awayML": 2.25 }));
    let result = evaluator().evaluate(&input);
    assert!(!result.is_ok());
    assert!(result.recommendations.is_empty());
    assert!(result.errors[0].contains("points"));
  }

  #[test]
  fn test_nfl_moneyline_tie_is_push() {
    let input = MatchInput::new("NFL", "Chiefs", "Bills")
      .with_odds(json!({ "homeML": "-150", "awayML": "+130", "spreadLine": -3, "homeSpread": 1.91, "awaySpread": 1.91 }))
      .with_params(ProjectedInputs {
        home_points: Some(24.0),
        away_points: Some(20.5),
        ..ProjectedInputs::default()
      });
    let result = evaluator().evaluate(&input);
    assert!(result.is_ok(), "{:?}", result.errors);

    let ml: Vec<_> = result
      .recommendations
      .iter()
      .filter(|r| r.market == Market::Moneyline)
      .collect();
    assert_eq!(ml.len(), 2);
    assert!(ml.iter().all(|r| r.push == 0.005));

    let spread: Vec<_> = result
      .recommendations
      .iter()
      .filter(|r| r.market == Market::Spread)
      .collect();
    assert_eq!(spread.len(), 2);
    assert!(spread[0].push > 0.0);
    assert_eq!(spread[0].selection, "Chiefs -3");
    assert_eq!(spread[1].selection, "Bills +3");
  }

  #[test]
  fn test_quarter_asian_handicap_is_skipped() {
    let input = football_match().with_odds(json!({
      "homeWin": 2.0, "draw": 3.3, "awayWin": 3.9,
      "asian_handicap": { "line": -0.25, "home": 1.90, "away": 1.95 }
    }));
    let result = evaluator().evaluate(&input);
    assert!(result.recommendations.iter().all(|r| r.market != Market::AsianHandicap));
    assert!(result.warnings.iter().any(|w| w.contains("quarter line")));
  }

  #[test]
  fn test_whole_asian_handicap_pushes_on_grid() {
    let input = football_match().with_odds(json!({
      "asian_handicap": { "line": -1, "home": 2.30, "away": 1.65 }
    }));
    let result = evaluator().evaluate(&input);
    let ah: Vec<_> = result
      .recommendations
      .iter()
      .filter(|r| r.market == Market::AsianHandicap)
      .collect();
    assert_eq!(ah.len(), 2);
    assert!(ah[0].push > 0.0);
    assert!((ah[0].probability + ah[0].push + ah[1].probability - 1.0).abs() < 1e-9);
  }

  #[test]
  fn test_fallback_tilts_devigged_market() {
    let input = MatchInput::new("Darts", "Price", "Littler")
      .with_odds(json!({ "homeML": 1.80, "awayML": 2.10 }))
      .with_params(ProjectedInputs {
        skew: Some(0.05),
        ..ProjectedInputs::default()
      });
    let result = evaluator().evaluate(&input);
    assert_eq!(result.sport, Sport::Other);

    let fair_home = result.market_vig.as_ref().unwrap().fair_probs[0];
    let win = result.model["win"].as_f64().unwrap();
    assert!((win - (fair_home + 0.05)).abs() < 1e-9);
    assert!(result.warnings.iter().any(|w| w.contains("fallback")));
  }

  #[test]
  fn test_tennis_has_no_totals_model() {
    let input = MatchInput::new("ATP", "Sinner", "Rune")
      .with_odds(json!({ "home": 1.60, "away": 2.40, "line": 22.5, "over": 1.9, "under": 1.9 }))
      .with_params(ProjectedInputs {
        p1_serve_hold: Some(0.68),
        p2_serve_hold: Some(0.62),
        ..ProjectedInputs::default()
      });
    let result = evaluator().evaluate(&input);
    assert_eq!(
      result
        .recommendations
        .iter()
        .filter(|r| r.market == Market::Moneyline)
        .count(),
      2
    );
    assert!(result.warnings.iter().any(|w| w.contains("not modeled for TENNIS")));
  }

  #[test]
  fn test_batch_keys_and_isolation() {
    let matches = vec![
      football_match(),
      MatchInput::new("Basketball", "A", "B"),
      MatchInput::new("Soccer", "C", "D"),
    ];
    let results = evaluator().evaluate_batch(&matches);
    assert_eq!(results.len(), 3);
    assert!(results["epl-1"].is_ok());
    assert!(!results["match_1"].is_ok());
    assert!(results["match_2"].warnings.iter().any(|w| w.contains("No usable odds")));
  }

  #[test]
  fn test_batch_duplicate_ids_never_overwrite() {
    let matches = vec![
      football_match().with_id("a"),
      football_match().with_id("a_2"),
      football_match().with_id("a"),
      football_match().with_id("a"),
    ];
    let results = evaluator().evaluate_batch(&matches);
    assert_eq!(results.len(), 4);
    let keys: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "a_2", "a_3", "a_4"]);
    assert!(results.iter().all(|(k, r)| *k == r.match_id));
  }

  #[test]
  fn test_elo_ratings_blend_the_1x2() {
    let plain = evaluator().evaluate(&football_match());
    let rated = football_match().with_params(ProjectedInputs {
      home_xg: Some(1.8),
      away_xg: Some(1.0),
      home_elo: Some(1500.0),
      away_elo: Some(1700.0),
      evidence_count: Some(5),
      ..ProjectedInputs::default()
    });
    let result = evaluator().evaluate(&rated);
    assert!(result.is_ok(), "{:?}", result.errors);

    let home = |r: &EngineResult| {
      r.recommendations
        .iter()
        .find(|x| x.selection == "Arsenal")
        .map(|x| x.probability)
        .unwrap()
    };
    assert!(home(&result) < home(&plain));
    assert!((result.model["elo"]["weight"].as_f64().unwrap() - 0.3).abs() < 1e-12);

    // totals come off the unblended grid
    let over = |r: &EngineResult| {
      r.recommendations
        .iter()
        .find(|x| x.market == Market::Total && x.selection.starts_with("Over"))
        .map(|x| x.probability)
        .unwrap()
    };
    assert_eq!(over(&result), over(&plain));
  }

  #[test]
  fn test_corners_priced_from_averages() {
    let input = football_match().with_odds(json!({
      "homeWin": 2.10, "draw": 3.40, "awayWin": 3.80,
      "corners": { "line": 10, "over": 1.90, "under": 1.90 }
    }));
    let result = evaluator().evaluate(&input);
    let corners: Vec<_> = result
      .recommendations
      .iter()
      .filter(|r| r.market == Market::Corners)
      .collect();
    assert_eq!(corners.len(), 2);
    assert_eq!(corners[0].selection, "Over 10");
    assert!(corners[0].push > 0.0);
    assert!((corners[0].probability + corners[0].push + corners[1].probability - 1.0).abs() < 1e-9);

    let busy = input.with_params(ProjectedInputs {
      home_xg: Some(1.8),
      away_xg: Some(1.0),
      home_corners: Some(7.5),
      away_corners: Some(6.0),
      ..ProjectedInputs::default()
    });
    let busy = evaluator().evaluate(&busy);
    let over = busy
      .recommendations
      .iter()
      .find(|r| r.market == Market::Corners)
      .unwrap();
    assert!(over.probability > corners[0].probability);
  }

  #[test]
  fn test_corners_not_modeled_outside_football() {
    let input = MatchInput::new("NHL", "Rangers", "Bruins")
      .with_odds(json!({ "homeML": 1.9, "awayML": 1.9, "cornersLine": 9.5, "cornersOver": 1.9 }))
      .with_params(ProjectedInputs {
        home_xg: Some(3.0),
        away_xg: Some(2.8),
        ..ProjectedInputs::default()
      });
    let result = evaluator().evaluate(&input);
    assert!(result.recommendations.iter().all(|r| r.market != Market::Corners));
    assert!(result.warnings.iter().any(|w| w.starts_with("corners market")));
  }

  #[test]
  fn test_hockey_possession_and_goalies_move_lambdas() {
    let params: ProjectedInputs = serde_json::from_value(json!({
      "home_xg": 3.0, "away_xg": 2.8,
      "homeFenwickShare": 0.52, "homeXGShare": 0.60,
      "homeGSAx": 0.1, "awayGSAx": 0.2
    }))
    .unwrap();
    let input = MatchInput::new("NHL", "Rangers", "Bruins")
      .with_odds(json!({ "homeML": 1.9, "awayML": 1.9 }))
      .with_params(params);
    let result = evaluator().evaluate(&input);
    assert!(result.is_ok(), "{:?}", result.errors);
    // Fenwick outranks the xG share
    assert!((result.model["diagnostics"]["possession_share"].as_f64().unwrap() - 0.52).abs() < 1e-12);
    let lambda_home = result.model["lambda_home"].as_f64().unwrap();
    assert!((lambda_home - (3.0 * 1.04 - 0.2)).abs() < 1e-9);
  }

  #[test]
  fn test_basketball_points_from_pace_and_ratings() {
    let params: ProjectedInputs = serde_json::from_value(json!({
      "pace": 98.0, "homeOrtg": 118.0, "homeDrtg": 110.0, "awayOrtg": 112.0, "awayDrtg": 116.0
    }))
    .unwrap();
    let input = MatchInput::new("NBA", "Celtics", "Heat")
      .with_odds(json!({ "homeML": 1.70, "awayML": 2.25 }))
      .with_params(params);
    let result = evaluator().evaluate(&input);
    assert!(result.is_ok(), "{:?}", result.errors);
    let total = result.model["predicted_total"].as_f64().unwrap();
    assert!((total - 0.98 * 228.0).abs() < 1e-9);

    // one side's points without the other is still an error
    let half = MatchInput::new("NBA", "Celtics", "Heat").with_params(ProjectedInputs {
      home_points: Some(110.0),
      ratings: PaceRatings {
        pace: Some(99.0),
        ..PaceRatings::default()
      },
      ..ProjectedInputs::default()
    });
    assert!(!evaluator().evaluate(&half).is_ok());
  }

  #[test]
  fn test_nfl_epa_margin_prices_sides_only() {
    let params: ProjectedInputs = serde_json::from_value(json!({
      "homeOffEPA": 0.12, "awayOffEPA": 0.02, "homeDefEPA": -0.03, "awayDefEPA": 0.04
    }))
    .unwrap();
    let odds = json!({
      "homeML": 1.60, "awayML": 2.45,
      "spreadLine": -3, "homeSpread": 1.91, "awaySpread": 1.91,
      "totalLine": 44.5, "totalOver": 1.91, "totalUnder": 1.91
    });
    let input = MatchInput::new("NFL", "Chiefs", "Bills")
      .with_odds(odds.clone())
      .with_params(params.clone());
    let result = evaluator().evaluate(&input);
    assert!(result.is_ok(), "{:?}", result.errors);
    assert!(result.recommendations.iter().any(|r| r.market == Market::Spread));
    assert!(result.recommendations.iter().all(|r| r.market != Market::Total));
    assert!(result.warnings.iter().any(|w| w.starts_with("total market")));

    let margin = params.efficiency.project(62.0, 1.8).margin;
    assert!((result.model["predicted_home_by"].as_f64().unwrap() - margin).abs() < 1e-9);

    let with_total = ProjectedInputs {
      efficiency: EpaInputs {
        total_mean_points: Some(46.0),
        ..params.efficiency
      },
      ..params
    };
    let result = evaluator().evaluate(
      &MatchInput::new("NFL", "Chiefs", "Bills")
        .with_odds(odds)
        .with_params(with_total),
    );
    assert!(result.recommendations.iter().any(|r| r.market == Market::Total));
    assert!((result.model["predicted_total"].as_f64().unwrap() - 46.0).abs() < 1e-9);
  }

  #[test]
  fn test_baseball_runs_from_pitching() {
    let params: ProjectedInputs = serde_json::from_value(json!({
      "homeSP_FIP": 2.9, "homeBullpen_ERA": 3.5,
      "awaySP_FIP": 4.8, "awayBullpen_ERA": 4.3,
      "parkFactor": 1.05
    }))
    .unwrap();
    let input = MatchInput::new("MLB", "Dodgers", "Giants")
      .with_odds(json!({ "homeML": 1.70, "awayML": 2.25, "totalLine": 9, "totalOver": 1.9, "totalUnder": 1.9 }))
      .with_params(params);
    let result = evaluator().evaluate(&input);
    assert!(result.is_ok(), "{:?}", result.errors);
    assert!(result.model["home_win"].as_f64().unwrap() > 0.5);
    let over = result
      .recommendations
      .iter()
      .find(|r| r.selection == "Over 9")
      .unwrap();
    assert!(over.push > 0.0);
  }

  #[test]
  fn test_min_ev_gate() {
    let mut config = EngineConfig::default();
    config.staking.min_ev = 5.0;
    let result = MatchEvaluator::new(&config).evaluate(&football_match());
    assert!(result.recommended().next().is_none());
    assert_graded_consistently(&result);
  }

  #[test]
  fn test_grade_thresholds() {
    assert_eq!(Level::grade(-0.01, 0.05, 0.0), Level::Avoid);
    assert_eq!(Level::grade(0.02, 0.0, 0.0), Level::Avoid);
    assert_eq!(Level::grade(f64::NAN, 0.05, 0.0), Level::Avoid);
    assert_eq!(Level::grade(0.02, 0.005, 0.0), Level::Lean);
    assert_eq!(Level::grade(0.04, 0.015, 0.0), Level::Good);
    assert_eq!(Level::grade(0.06, 0.015, 0.0), Level::Good);
    assert_eq!(Level::grade(0.06, 0.025, 0.0), Level::Strong);
    assert_eq!(Level::grade(0.06, 0.025, 0.10), Level::Avoid);
  }

  #[test]
  fn test_quarter_line_detection() {
    assert!(is_quarter_line(-0.25));
    assert!(is_quarter_line(1.75));
    assert!(!is_quarter_line(-0.5));
    assert!(!is_quarter_line(2.0));
    assert!(!is_quarter_line(2.3));
  }

  #[test]
  fn test_combo_of_best_legs() {
    let ev = evaluator();
    let result = ev.evaluate(&football_match());
    let legs = MatchEvaluator::best_legs([&result]);
    assert_eq!(legs.len(), 1);

    let same_match = vec![legs[0].clone(), legs[0].clone()];
    let combo = ev.analyze_combo(&same_match);
    assert_eq!(combo.legs_count, 2);
    assert!(combo.correlation_penalty_used > 0.0);
  }
}
