//! Hockey: regulation Poisson grid plus an overtime/shootout allocation of
//! the regulation draw for the two-way moneyline.
//!
//! Expected goals are first adjusted for shot-share dominance and for the
//! opposing goalie's goals saved above expected (GSAx):
//! `μ_home = xG_home · (1 + s·(share − 0.5)) − g·GSAx_away`, mirrored for the
//! away side, floored at 0.05.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::football::safe_lambda;
use crate::domain::distributions::{ScoreGrid, Scoreline, SpreadProbs, TotalProbs, clamp01};

pub const DEFAULT_MAX_GOALS: usize = 12;
pub const DEFAULT_OT_DAMPING: f64 = 0.6;
const DEFAULT_HOME_XG: f64 = 2.9;
const DEFAULT_AWAY_XG: f64 = 2.7;
const MASS_WARN_THRESHOLD: f64 = 0.995;

pub const DEFAULT_POSSESSION_SCALE: f64 = 2.0;
pub const DEFAULT_GOALIE_SCALE: f64 = 1.0;
const SHARE_MIN: f64 = 0.35;
const SHARE_MAX: f64 = 0.65;
const MIN_LAMBDA: f64 = 0.05;

/// How a regulation draw is split between the teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtMode {
    /// Coin flip.
    #[default]
    #[serde(rename = "split_50_50", alias = "SPLIT_50_50")]
    Split5050,
    /// Expected-goal share shrunk toward 0.5.
    #[serde(alias = "SPLIT_XG_SHARE")]
    XgShare,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OtModel {
    #[serde(default)]
    pub mode: OtMode,
    /// Fixed home share in [0, 1]; wins over `mode`.
    #[serde(default)]
    pub home_share_override: Option<f64>,
    #[serde(default = "default_damping")]
    pub damping: f64,
}

const fn default_damping() -> f64 {
    DEFAULT_OT_DAMPING
}

impl Default for OtModel {
    fn default() -> Self {
        Self {
            mode: OtMode::Split5050,
            home_share_override: None,
            damping: DEFAULT_OT_DAMPING,
        }
    }
}

impl OtModel {
    /// Home share of the regulation draw.
    pub fn home_share(&self, lambda_home: f64, lambda_away: f64) -> f64 {
        if let Some(share) = self.home_share_override.filter(|s| s.is_finite()) {
            return clamp01(share);
        }
        match self.mode {
            OtMode::Split5050 => 0.5,
            OtMode::XgShare => {
                let share = lambda_home / (lambda_home + lambda_away);
                clamp01((share - 0.5).mul_add(self.damping, 0.5))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HockeyInputs {
    pub home_xg: f64,
    pub away_xg: f64,
    #[serde(default = "default_max_goals")]
    pub max_goals: usize,
    #[serde(default)]
    pub ot_model: OtModel,
    /// Home Corsi/Fenwick/xG share in [0, 1]; clamped to [0.35, 0.65].
    #[serde(default)]
    pub home_share: Option<f64>,
    #[serde(default)]
    pub home_gsax: f64,
    #[serde(default)]
    pub away_gsax: f64,
    #[serde(default = "default_possession_scale")]
    pub possession_scale: f64,
    #[serde(default = "default_goalie_scale")]
    pub goalie_scale: f64,
    #[serde(default)]
    pub return_matrix: bool,
}

const fn default_max_goals() -> usize {
    DEFAULT_MAX_GOALS
}

const fn default_possession_scale() -> f64 {
    DEFAULT_POSSESSION_SCALE
}

const fn default_goalie_scale() -> f64 {
    DEFAULT_GOALIE_SCALE
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

impl HockeyInputs {
    /// Possession share in effect, 0.5 when none was given.
    pub fn share(&self) -> f64 {
        self.home_share
            .filter(|s| s.is_finite())
            .map_or(0.5, |s| s.clamp(SHARE_MIN, SHARE_MAX))
    }

    /// Expected goals after the possession and goalie adjustments.
    pub fn adjusted_lambdas(&self, base_home: f64, base_away: f64) -> (f64, f64) {
        let scale = finite_or(self.possession_scale, DEFAULT_POSSESSION_SCALE);
        let tilt = scale * (self.share() - 0.5);
        let goalie = finite_or(self.goalie_scale, DEFAULT_GOALIE_SCALE);
        let home = base_home * (1.0 + tilt) - goalie * finite_or(self.away_gsax, 0.0);
        let away = base_away * (1.0 - tilt) - goalie * finite_or(self.home_gsax, 0.0);
        (home.max(MIN_LAMBDA), away.max(MIN_LAMBDA))
    }
}

impl HockeyInputs {
    pub fn new(home_xg: f64, away_xg: f64) -> Self {
        Self {
            home_xg,
            away_xg,
            max_goals: DEFAULT_MAX_GOALS,
            ot_model: OtModel::default(),
            home_share: None,
            home_gsax: 0.0,
            away_gsax: 0.0,
            possession_scale: DEFAULT_POSSESSION_SCALE,
            goalie_scale: DEFAULT_GOALIE_SCALE,
            return_matrix: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HockeyDiagnostics {
    pub max_goals: usize,
    pub possession_share: f64,
    pub mass_covered: f64,
    pub most_likely_score: Scoreline,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HockeyProbs {
    pub lambda_home: f64,
    pub lambda_away: f64,
    pub home_win_reg: f64,
    pub draw_reg: f64,
    pub away_win_reg: f64,
    /// Moneyline including OT/SO.
    pub home_win_ot: f64,
    pub away_win_ot: f64,
    pub ot_home_share_used: f64,
    pub predicted_total: f64,
    pub diagnostics: HockeyDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_matrix: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone)]
pub struct HockeyModel {
    lambda_home: f64,
    lambda_away: f64,
    possession_share: f64,
    ot_model: OtModel,
    grid: ScoreGrid,
}

impl HockeyModel {
    pub fn fit(inputs: &HockeyInputs) -> Self {
        let (lambda_home, lambda_away) = inputs.adjusted_lambdas(
            safe_lambda(inputs.home_xg, DEFAULT_HOME_XG),
            safe_lambda(inputs.away_xg, DEFAULT_AWAY_XG),
        );
        Self {
            lambda_home,
            lambda_away,
            possession_share: inputs.share(),
            ot_model: inputs.ot_model,
            grid: ScoreGrid::new(lambda_home, lambda_away, inputs.max_goals),
        }
    }

    pub fn probs(&self, return_matrix: bool) -> HockeyProbs {
        let g = &self.grid;
        let home_reg = g.sum_where(|x, y| x > y);
        let draw_reg = g.sum_where(|x, y| x == y);
        let away_reg = g.sum_where(|x, y| x < y);

        let share = self.ot_model.home_share(self.lambda_home, self.lambda_away);

        let mass_covered = g.mass_covered();
        let note = if mass_covered < MASS_WARN_THRESHOLD {
            warn!(
                max_goals = g.max_goals(),
                mass_covered, "hockey grid mass covered is low"
            );
            "massCovered low -> increase maxGoals (e.g., 14-16) for better accuracy"
        } else {
            "ok"
        };

        HockeyProbs {
            lambda_home: self.lambda_home,
            lambda_away: self.lambda_away,
            home_win_reg: home_reg,
            draw_reg,
            away_win_reg: away_reg,
            home_win_ot: clamp01(share.mul_add(draw_reg, home_reg)),
            away_win_ot: clamp01((1.0 - share).mul_add(draw_reg, away_reg)),
            ot_home_share_used: share,
            predicted_total: self.lambda_home + self.lambda_away,
            diagnostics: HockeyDiagnostics {
                max_goals: g.max_goals(),
                possession_share: self.possession_share,
                mass_covered,
                most_likely_score: g.most_likely_score(),
                note: note.to_string(),
            },
            score_matrix: return_matrix.then(|| g.matrix()),
        }
    }

    pub fn over_prob(&self, line: f64) -> f64 {
        self.grid.over_prob(line)
    }

    /// Regulation totals, exact over the grid.
    pub fn total_probs(&self, line: f64) -> TotalProbs {
        self.grid.total_split(line).into()
    }

    /// Regulation puck line for the HOME side, exact over the grid.
    pub fn handicap_probs(&self, home_line: f64) -> SpreadProbs {
        self.grid.handicap_split(home_line).into()
    }
}

pub fn calc_hockey_probs(inputs: &HockeyInputs) -> HockeyProbs {
    HockeyModel::fit(inputs).probs(inputs.return_matrix)
}
