//! Football (soccer): Poisson scorelines on a truncated grid.
//!
//! Expected goals are optionally weather-adjusted, then expanded into a
//! joint score grid sized per team to a tail-mass target. Low-scoring
//! matches get the Dixon–Coles correction on the 0-0/1-0/0-1/1-1 cells.
//! Every aggregate is renormalized by the captured mass so 1X2 sums to one
//! regardless of truncation. BTTS is computed both from the grid and from
//! the marginal identity; the gap is reported as a truncation diagnostic.
//! When Elo ratings are supplied the 1X2 is blended toward the Elo
//! expectation, keeping the grid's draw.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::weather::{WeatherReport, adjust_for_weather};
use crate::domain::distributions::{
    ScoreGrid, Scoreline, SpreadProbs, TotalProbs, adaptive_k_max, clamp01, elo_win_prob,
};

pub const DEFAULT_MAX_GOALS: usize = 10;
pub const DEFAULT_RHO: f64 = -0.03;
pub const DEFAULT_TAIL_MASS: f64 = 0.9995;
pub const DEFAULT_ELO_WEIGHT: f64 = 0.30;
pub const DEFAULT_ELO_SCALE: f64 = 400.0;
const DEFAULT_HOME_XG: f64 = 1.5;
const DEFAULT_AWAY_XG: f64 = 1.2;

/// Both sides under this xG switch Dixon–Coles on in `Auto` mode.
const DC_AUTO_MAX_XG: f64 = 1.35;
/// Elo weight with no supporting evidence, and evidence count that earns
/// the base weight.
const ELO_HEAVY_WEIGHT: f64 = 0.8;
const ELO_EVIDENCE_FULL: f64 = 5.0;
const ELO_MAX_WEIGHT: f64 = 0.9;

const MASS_WARN_THRESHOLD: f64 = 0.995;
const BTTS_GAP_WARN_THRESHOLD: f64 = 0.01;

/// When the Dixon–Coles correction is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DixonColesMode {
    Off,
    On,
    /// Only when both sides project under 1.35 goals.
    #[default]
    Auto,
}

impl DixonColesMode {
    fn applies(self, lambda_home: f64, lambda_away: f64) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::Auto => lambda_home < DC_AUTO_MAX_XG && lambda_away < DC_AUTO_MAX_XG,
        }
    }
}

/// Elo ratings and the weight the Elo expectation gets in the 1X2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloInputs {
    pub home: f64,
    pub away: f64,
    pub weight: f64,
    #[serde(default = "default_elo_scale")]
    pub scale: f64,
}

const fn default_elo_scale() -> f64 {
    DEFAULT_ELO_SCALE
}

/// Elo weight from how much research backs the xG: `0.8` with none,
/// sliding linearly to `base` at five pieces of evidence, capped at 0.9.
pub fn elo_weight(evidence: usize, base: f64) -> f64 {
    let trust = (evidence as f64 / ELO_EVIDENCE_FULL).min(1.0);
    let w = ELO_HEAVY_WEIGHT - trust * (ELO_HEAVY_WEIGHT - base);
    if w.is_finite() { w.clamp(0.0, ELO_MAX_WEIGHT) } else { 0.0 }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootballInputs {
    pub home_xg: f64,
    pub away_xg: f64,
    #[serde(default)]
    pub weather: Option<WeatherReport>,
    /// Hard per-team goal cap.
    #[serde(default = "default_max_goals")]
    pub max_goals: usize,
    /// Per-team Poisson CDF the grid must reach; `None` uses the full cap.
    #[serde(default = "default_tail_mass")]
    pub tail_mass_target: Option<f64>,
    #[serde(default)]
    pub dixon_coles: DixonColesMode,
    #[serde(default = "default_rho")]
    pub rho: f64,
    #[serde(default)]
    pub elo: Option<EloInputs>,
    #[serde(default)]
    pub return_matrix: bool,
}

const fn default_max_goals() -> usize {
    DEFAULT_MAX_GOALS
}

const fn default_tail_mass() -> Option<f64> {
    Some(DEFAULT_TAIL_MASS)
}

const fn default_rho() -> f64 {
    DEFAULT_RHO
}

impl FootballInputs {
    pub fn new(home_xg: f64, away_xg: f64) -> Self {
        Self {
            home_xg,
            away_xg,
            weather: None,
            max_goals: DEFAULT_MAX_GOALS,
            tail_mass_target: Some(DEFAULT_TAIL_MASS),
            dixon_coles: DixonColesMode::Auto,
            rho: DEFAULT_RHO,
            elo: None,
            return_matrix: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootballDiagnostics {
    pub max_goals: usize,
    pub home_max_goals: usize,
    pub away_max_goals: usize,
    /// Dixon–Coles rho in effect; 0 when the grid is independent.
    pub rho: f64,
    pub mass_covered: f64,
    pub most_likely_score: Scoreline,
    pub btts_identity: f64,
    pub btts_matrix: f64,
    pub btts_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootballProbs {
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub over_2_5: f64,
    pub under_2_5: f64,
    pub btts_yes: f64,
    pub btts_no: f64,
    pub diagnostics: FootballDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elo: Option<EloBlend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_matrix: Option<Vec<Vec<f64>>>,
}

/// The grid's 1X2 before blending, and what it was blended with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EloBlend {
    pub elo_home_win: f64,
    pub weight: f64,
    pub xg_home_win: f64,
    pub xg_draw: f64,
    pub xg_away_win: f64,
}

/// Shift home/away toward the Elo expectation by `weight`, keep the draw,
/// renormalize.
fn blend_with_elo(home: f64, draw: f64, away: f64, elo_home: f64, weight: f64) -> (f64, f64, f64) {
    let keep = 1.0 - weight;
    let h = home * keep + elo_home * weight;
    let a = away * keep + (1.0 - elo_home) * weight;
    let s = h + draw + a;
    if s > 0.0 {
        (clamp01(h / s), clamp01(draw / s), clamp01(a / s))
    } else {
        (home, draw, away)
    }
}

/// Positive finite value or `fallback`.
pub(crate) fn safe_lambda(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}

/// Fitted football model. Line queries re-sum the same normalized grid.
#[derive(Debug, Clone)]
pub struct FootballModel {
    lambda_home: f64,
    lambda_away: f64,
    elo: Option<EloInputs>,
    grid: ScoreGrid,
}

impl FootballModel {
    pub fn fit(inputs: &FootballInputs) -> Self {
        let base_home = safe_lambda(inputs.home_xg, DEFAULT_HOME_XG);
        let base_away = safe_lambda(inputs.away_xg, DEFAULT_AWAY_XG);

        let weather = inputs.weather.as_ref();
        let lambda_home = safe_lambda(adjust_for_weather(base_home, weather), base_home);
        let lambda_away = safe_lambda(adjust_for_weather(base_away, weather), base_away);

        let cap = |lambda: f64| match inputs.tail_mass_target.filter(|t| t.is_finite()) {
            Some(target) => adaptive_k_max(lambda, target, inputs.max_goals),
            None => inputs.max_goals,
        };
        let rho = if inputs.dixon_coles.applies(lambda_home, lambda_away) {
            inputs.rho
        } else {
            0.0
        };

        let grid = ScoreGrid::shaped(
            lambda_home,
            lambda_away,
            cap(lambda_home),
            cap(lambda_away),
            rho,
        );

        Self {
            lambda_home,
            lambda_away,
            elo: inputs.elo,
            grid,
        }
    }

    pub fn grid(&self) -> &ScoreGrid {
        &self.grid
    }

    /// Market probabilities and diagnostics.
    pub fn probs(&self, return_matrix: bool) -> FootballProbs {
        let g = &self.grid;

        let xg_home_win = g.sum_where(|x, y| x > y);
        let xg_draw = g.sum_where(|x, y| x == y);
        let xg_away_win = g.sum_where(|x, y| x < y);
        let over_2_5 = g.over_prob(2.5);
        let btts = g.sum_where(|x, y| x > 0 && y > 0);

        // τ leaves the marginals alone, so only the 0-0 cell differs from
        // the independent identity.
        let p0_home = g.home_pmf()[0];
        let p0_away = g.away_pmf()[0];
        let btts_identity = clamp01(1.0 - p0_home - p0_away + g.raw(0, 0));

        let elo = self.elo.and_then(|e| {
            let elo_home_win = elo_win_prob(e.home, e.away, e.scale);
            let weight = if e.weight.is_finite() {
                e.weight.clamp(0.0, ELO_MAX_WEIGHT)
            } else {
                0.0
            };
            (elo_home_win.is_finite() && weight > 0.0).then_some(EloBlend {
                elo_home_win,
                weight,
                xg_home_win,
                xg_draw,
                xg_away_win,
            })
        });
        let (home_win, draw, away_win) = match elo {
            Some(b) => blend_with_elo(xg_home_win, xg_draw, xg_away_win, b.elo_home_win, b.weight),
            None => (xg_home_win, xg_draw, xg_away_win),
        };

        let diagnostics = FootballDiagnostics {
            max_goals: g.max_goals(),
            home_max_goals: g.home_max(),
            away_max_goals: g.away_max(),
            rho: g.rho(),
            mass_covered: g.mass_covered(),
            most_likely_score: g.most_likely_score(),
            btts_identity,
            btts_matrix: btts,
            btts_gap: btts - btts_identity,
        };

        if diagnostics.mass_covered < MASS_WARN_THRESHOLD
            || diagnostics.btts_gap.abs() > BTTS_GAP_WARN_THRESHOLD
        {
            warn!(
                max_goals = diagnostics.max_goals,
                mass_covered = diagnostics.mass_covered,
                btts_gap = diagnostics.btts_gap,
                "football grid truncation too aggressive"
            );
        }

        FootballProbs {
            lambda_home: self.lambda_home,
            lambda_away: self.lambda_away,
            home_win,
            draw,
            away_win,
            over_2_5,
            under_2_5: clamp01(1.0 - over_2_5),
            btts_yes: btts,
            btts_no: clamp01(1.0 - btts),
            diagnostics,
            elo,
            score_matrix: return_matrix.then(|| g.matrix()),
        }
    }

    /// `P(total > line)` for any line.
    pub fn over_prob(&self, line: f64) -> f64 {
        self.grid.over_prob(line)
    }

    /// Exact over/push/under for any totals line.
    pub fn total_probs(&self, line: f64) -> TotalProbs {
        self.grid.total_split(line).into()
    }

    /// Exact Asian handicap split for a whole or half HOME line.
    pub fn handicap_probs(&self, home_line: f64) -> SpreadProbs {
        self.grid.handicap_split(home_line).into()
    }
}

/// Fit and evaluate in one step.
pub fn calc_football_probs(inputs: &FootballInputs) -> FootballProbs {
    FootballModel::fit(inputs).probs(inputs.return_matrix)
}
