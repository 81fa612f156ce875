//! American football: Normal margin/total with an explicit tie mass on the
//! moneyline.
//!
//! The margin can be projected from per-play efficiency: net EPA blended
//! with net success rate (scaled onto the EPA axis), times plays per team,
//! plus home-field advantage and capped situational adjustments. Without a
//! projected total such a model prices sides only.

use serde::{Deserialize, Serialize};

use super::basketball::safe_std;
use crate::domain::distributions::{NormalScoreModel, SpreadProbs, TotalProbs, clamp01};

pub const DEFAULT_MARGIN_STD: f64 = 13.5;
pub const DEFAULT_TOTAL_STD: f64 = 13.5;
pub const DEFAULT_TIE_PROB: f64 = 0.005;
pub const DEFAULT_PLAYS_PER_TEAM: f64 = 62.0;
pub const DEFAULT_HFA: f64 = 1.8;
const EPA_WEIGHT: f64 = 0.65;
const SR_WEIGHT: f64 = 0.35;
/// Success-rate points to EPA: a 0.04 SR edge is worth ~0.10 EPA.
const SR_TO_EPA: f64 = 2.5;
const MAX_ADJ_POINTS: f64 = 6.0;
const BASE_HOME_OFF_EPA: f64 = 0.03;
const BASE_AWAY_OFF_EPA: f64 = 0.02;
const BASE_SUCCESS_RATE: f64 = 0.45;

/// Per-play efficiency research. Defensive figures are EPA and success
/// rate allowed. Missing values take league baselines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpaInputs {
    #[serde(alias = "homeOffEPA")]
    pub home_off_epa: Option<f64>,
    #[serde(alias = "homeDefEPA")]
    pub home_def_epa: Option<f64>,
    #[serde(alias = "awayOffEPA")]
    pub away_off_epa: Option<f64>,
    #[serde(alias = "awayDefEPA")]
    pub away_def_epa: Option<f64>,
    #[serde(alias = "homeOffSR")]
    pub home_off_sr: Option<f64>,
    #[serde(alias = "homeDefSR")]
    pub home_def_sr: Option<f64>,
    #[serde(alias = "awayOffSR")]
    pub away_off_sr: Option<f64>,
    #[serde(alias = "awayDefSR")]
    pub away_def_sr: Option<f64>,
    #[serde(alias = "playsPerTeam")]
    pub plays_per_team: Option<f64>,
    pub hfa: Option<f64>,
    /// Combined situational adjustment in home points; wins over the parts.
    #[serde(alias = "adjPoints")]
    pub adj_points: Option<f64>,
    #[serde(alias = "qbAdjPoints")]
    pub qb_adj_points: Option<f64>,
    #[serde(alias = "injuryAdjPoints")]
    pub injury_adj_points: Option<f64>,
    #[serde(alias = "weatherAdjPoints")]
    pub weather_adj_points: Option<f64>,
    #[serde(alias = "totalMeanPoints")]
    pub total_mean_points: Option<f64>,
}

/// Projected home margin and, when researched, the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NflProjection {
    pub margin: f64,
    pub total: Option<f64>,
    /// Situational adjustment applied, after the ±6 cap.
    pub adj_points: f64,
    pub adj_capped: bool,
}

impl EpaInputs {
    /// True when any efficiency figure was researched.
    pub fn has_efficiency(&self) -> bool {
        [
            self.home_off_epa,
            self.home_def_epa,
            self.away_off_epa,
            self.away_def_epa,
            self.home_off_sr,
            self.home_def_sr,
            self.away_off_sr,
            self.away_def_sr,
        ]
        .iter()
        .any(Option::is_some)
    }

    /// Project with `plays` and `hfa` as the configured priors; researched
    /// values override them.
    pub fn project(&self, plays: f64, hfa: f64) -> NflProjection {
        let or = |v: Option<f64>, d: f64| v.filter(|x| x.is_finite()).unwrap_or(d);

        let net_epa = (or(self.home_off_epa, BASE_HOME_OFF_EPA) - or(self.away_def_epa, 0.0))
            - (or(self.away_off_epa, BASE_AWAY_OFF_EPA) - or(self.home_def_epa, 0.0));
        let sr = |v: Option<f64>| or(v, BASE_SUCCESS_RATE);
        let net_sr = (sr(self.home_off_sr) - sr(self.away_def_sr))
            - (sr(self.away_off_sr) - sr(self.home_def_sr));
        let per_play = EPA_WEIGHT * net_epa + SR_WEIGHT * net_sr * SR_TO_EPA;

        let parts = [
            self.qb_adj_points,
            self.injury_adj_points,
            self.weather_adj_points,
        ];
        let raw_adj = match self.adj_points.filter(|x| x.is_finite() && *x != 0.0) {
            Some(adj) => adj,
            None => parts.iter().map(|p| or(*p, 0.0)).sum(),
        };
        let adj_points = raw_adj.clamp(-MAX_ADJ_POINTS, MAX_ADJ_POINTS);

        NflProjection {
            margin: per_play * or(self.plays_per_team, plays) + or(self.hfa, hfa) + adj_points,
            total: self.total_mean_points.filter(|t| t.is_finite() && *t > 0.0),
            adj_points,
            adj_capped: adj_points != raw_adj,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NflInputs {
    pub home_points: f64,
    pub away_points: f64,
    #[serde(default = "default_margin_std")]
    pub margin_std: f64,
    #[serde(default = "default_total_std")]
    pub total_std: f64,
    #[serde(default = "default_tie_prob")]
    pub tie_prob: f64,
}

const fn default_margin_std() -> f64 {
    DEFAULT_MARGIN_STD
}

const fn default_total_std() -> f64 {
    DEFAULT_TOTAL_STD
}

const fn default_tie_prob() -> f64 {
    DEFAULT_TIE_PROB
}

impl NflInputs {
    pub fn new(home_points: f64, away_points: f64) -> Self {
        Self {
            home_points,
            away_points,
            margin_std: DEFAULT_MARGIN_STD,
            total_std: DEFAULT_TOTAL_STD,
            tie_prob: DEFAULT_TIE_PROB,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NflProbs {
    pub home_win: f64,
    pub away_win: f64,
    pub tie: f64,
    pub predicted_home_by: f64,
    pub predicted_away_by: f64,
    pub predicted_total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NflModel {
    normal: NormalScoreModel,
    tie_prob: f64,
}

impl NflModel {
    pub fn fit(inputs: &NflInputs) -> Self {
        let tie_prob = if inputs.tie_prob.is_finite() {
            clamp01(inputs.tie_prob)
        } else {
            0.0
        };

        let (h, a) = (inputs.home_points, inputs.away_points);
        if !h.is_finite() || !a.is_finite() {
            return Self {
                normal: NormalScoreModel::INVALID,
                tie_prob: f64::NAN,
            };
        }

        Self {
            normal: NormalScoreModel {
                margin_mean: h - a,
                margin_std: safe_std(inputs.margin_std, DEFAULT_MARGIN_STD),
                total_mean: h + a,
                total_std: safe_std(inputs.total_std, DEFAULT_TOTAL_STD),
            },
            tie_prob,
        }
    }

    /// Sides-only model around a projected margin; totals are NaN.
    pub fn fit_margin(margin: f64, inputs: &NflInputs) -> Self {
        let mut model = Self::fit(&NflInputs {
            home_points: margin,
            away_points: 0.0,
            ..*inputs
        });
        model.normal.total_mean = f64::NAN;
        model
    }

    /// Whether the model projects a total.
    pub fn has_total(&self) -> bool {
        self.normal.total_mean.is_finite()
    }

    /// `home + away + tie = 1`: the tie mass is taken proportionally from
    /// both sides.
    pub fn probs(&self) -> NflProbs {
        let scale = 1.0 - self.tie_prob;
        let home_win = clamp01(self.normal.home_margin_positive() * scale);
        NflProbs {
            home_win,
            away_win: clamp01(scale - home_win),
            tie: self.tie_prob,
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
}

pub fn calc_nfl_probs(inputs: &NflInputs) -> NflProbs {
    NflModel::fit(inputs).probs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moneyline_with_tie_sums_to_one() {
        let p = calc_nfl_probs(&NflInputs::new(24.0, 20.5));
        assert!((p.home_win + p.away_win + p.tie - 1.0).abs() < 1e-12);
        assert_eq!(p.tie, 0.005);
        assert!(p.home_win > p.away_win);
    }

    #[test]
    fn test_key_number_push() {
        let m = NflModel::fit(&NflInputs::new(23.0, 20.0));
        let s = m.spread_probs(-3.0);
        assert!(s.push > 0.0);
        assert!((s.cover + s.push + s.no_cover - 1.0).abs() < 1e-9);
        assert_eq!(m.spread_probs(-3.5).push, 0.0);

        let t = m.total_probs(43.0);
        assert!(t.push > 0.0);
        assert!((t.over + t.push + t.under - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_inputs_are_nan() {
        let p = calc_nfl_probs(&NflInputs::new(f64::INFINITY, 20.0));
        assert!(p.home_win.is_nan());
        assert!(p.tie.is_nan());
        let m = NflModel::fit(&NflInputs::new(f64::NAN, 20.0));
        assert!(m.total_probs(44.5).over.is_nan());
    }

    #[test]
    fn test_epa_projection_baseline() {
        let proj = EpaInputs::default().project(DEFAULT_PLAYS_PER_TEAM, DEFAULT_HFA);
        // 0.65 · 0.01 · 62 + 1.8
        assert!((proj.margin - (0.65 * 0.01 * 62.0 + 1.8)).abs() < 1e-9);
        assert_eq!(proj.total, None);
        assert!(!EpaInputs::default().has_efficiency());
    }

    #[test]
    fn test_epa_projection_blends_success_rate() {
        let inputs = EpaInputs {
            home_off_epa: Some(0.10),
            home_def_epa: Some(-0.05),
            away_off_epa: Some(0.00),
            away_def_epa: Some(0.02),
            home_off_sr: Some(0.48),
            away_off_sr: Some(0.44),
            plays_per_team: Some(60.0),
            hfa: Some(1.5),
            ..EpaInputs::default()
        };
        let proj = inputs.project(DEFAULT_PLAYS_PER_TEAM, DEFAULT_HFA);
        // net EPA (0.10 − 0.02) − (0.00 + 0.05) = 0.03, net SR 0.04
        let per_play = 0.65 * 0.03 + 0.35 * 0.04 * 2.5;
        assert!((proj.margin - (per_play * 60.0 + 1.5)).abs() < 1e-9);
        assert!(inputs.has_efficiency());
    }

    #[test]
    fn test_adjustments_are_capped() {
        let inputs = EpaInputs {
            qb_adj_points: Some(-5.0),
            injury_adj_points: Some(-3.0),
            ..EpaInputs::default()
        };
        let proj = inputs.project(DEFAULT_PLAYS_PER_TEAM, 0.0);
        assert_eq!(proj.adj_points, -6.0);
        assert!(proj.adj_capped);

        let combined = EpaInputs {
            adj_points: Some(2.0),
            qb_adj_points: Some(-5.0),
            ..EpaInputs::default()
        };
        let proj = combined.project(DEFAULT_PLAYS_PER_TEAM, 0.0);
        assert_eq!(proj.adj_points, 2.0);
        assert!(!proj.adj_capped);
    }

    #[test]
    fn test_margin_only_model_prices_sides() {
        let m = NflModel::fit_margin(3.0, &NflInputs::new(0.0, 0.0));
        assert!(!m.has_total());
        assert!(m.total_probs(44.5).over.is_nan());
        let p = m.probs();
        assert!(p.home_win > p.away_win);
        assert_eq!(p.predicted_home_by, 3.0);
        assert!(m.spread_probs(-3.0).push > 0.0);
        assert!(NflModel::fit(&NflInputs::new(24.0, 20.0)).has_total());
    }
}
