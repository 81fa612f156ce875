//! Basketball: Normal approximation of margin and total from projected points.
//!
//! Points can be projected from pace and efficiency ratings: each side
//! scores `pace/100 · (own ORtg + opponent DRtg) / 2`.

use serde::{Deserialize, Serialize};

use crate::domain::distributions::{NormalScoreModel, SpreadProbs, TotalProbs, clamp01};

pub const DEFAULT_MARGIN_STD: f64 = 12.0;
pub const DEFAULT_TOTAL_STD: f64 = 17.0;
pub const LEAGUE_PACE: f64 = 100.0;
pub const LEAGUE_RATING: f64 = 114.0;

/// Possessions per 48 minutes and points per 100 possessions. Missing
/// values take the league baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceRatings {
    pub pace: Option<f64>,
    #[serde(alias = "homeOrtg")]
    pub home_ortg: Option<f64>,
    #[serde(alias = "homeDrtg")]
    pub home_drtg: Option<f64>,
    #[serde(alias = "awayOrtg")]
    pub away_ortg: Option<f64>,
    #[serde(alias = "awayDrtg")]
    pub away_drtg: Option<f64>,
}

impl PaceRatings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Projected (home, away) points.
    pub fn project(&self) -> (f64, f64) {
        let or = |v: Option<f64>, d: f64| v.filter(|x| x.is_finite()).unwrap_or(d);
        let pace = or(self.pace, LEAGUE_PACE) / 100.0;
        let rating = |v: Option<f64>| or(v, LEAGUE_RATING);
        let home_eff = (rating(self.home_ortg) + rating(self.away_drtg)) / 2.0;
        let away_eff = (rating(self.away_ortg) + rating(self.home_drtg)) / 2.0;
        (pace * home_eff, pace * away_eff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasketballInputs {
    pub home_points: f64,
    pub away_points: f64,
    #[serde(default = "default_margin_std")]
    pub margin_std: f64,
    #[serde(default = "default_total_std")]
    pub total_std: f64,
}

const fn default_margin_std() -> f64 {
    DEFAULT_MARGIN_STD
}

const fn default_total_std() -> f64 {
    DEFAULT_TOTAL_STD
}

impl BasketballInputs {
    pub fn new(home_points: f64, away_points: f64) -> Self {
        Self {
            home_points,
            away_points,
            margin_std: DEFAULT_MARGIN_STD,
            total_std: DEFAULT_TOTAL_STD,
        }
    }
}

/// Positive finite std or `fallback`.
pub(crate) fn safe_std(v: f64, fallback: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { fallback }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BasketballProbs {
    pub home_win: f64,
    pub away_win: f64,
    pub predicted_home_by: f64,
    pub predicted_away_by: f64,
    pub predicted_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketballModel {
    normal: NormalScoreModel,
}

impl BasketballModel {
    /// Non-finite points give a model whose every query is NaN.
    pub fn fit(inputs: &BasketballInputs) -> Self {
        let (h, a) = (inputs.home_points, inputs.away_points);
        if !h.is_finite() || !a.is_finite() {
            return Self {
                normal: NormalScoreModel::INVALID,
            };
        }
        Self {
            normal: NormalScoreModel {
                margin_mean: h - a,
                margin_std: safe_std(inputs.margin_std, DEFAULT_MARGIN_STD),
                total_mean: h + a,
                total_std: safe_std(inputs.total_std, DEFAULT_TOTAL_STD),
            },
        }
    }

    /// Moneyline assumes overtime is included, so there is no tie mass.
    pub fn probs(&self) -> BasketballProbs {
        let home_win = self.normal.home_margin_positive();
        BasketballProbs {
            home_win,
            away_win: clamp01(1.0 - home_win),
            predicted_home_by: self.normal.margin_mean,
            predicted_away_by: -self.normal.margin_mean,
            predicted_total: self.normal.total_mean,
        }
    }

    pub fn spread_probs(&self, home_line: f64) -> SpreadProbs {
        self.normal.spread_probs(home_line)
    }

    pub fn total_probs(&self, line: f64) -> TotalProbs {
        self.normal.total_probs(line)
    }

    /// Cover probability only; a push counts as not covering.
    pub fn home_cover_prob(&self, home_line: f64) -> f64 {
        self.spread_probs(home_line).cover
    }

    /// Over probability only; a push counts as not over.
    pub fn over_prob(&self, line: f64) -> f64 {
        self.total_probs(line).over
    }
}

pub fn calc_basketball_probs(inputs: &BasketballInputs) -> BasketballProbs {
    BasketballModel::fit(inputs).probs()
}
