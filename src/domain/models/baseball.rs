//! Baseball: Pythagorean moneyline, negative binomial totals and a Normal
//! run-margin runline.
//!
//! Runs can be projected from pitching: each staff's runs allowed per nine
//! is the starter's FIP and the bullpen's ERA weighted by innings, and a
//! side scores the league average scaled by the opposing RA9 and the park
//! factor.

use serde::{Deserialize, Serialize};

use super::basketball::safe_std;
use crate::domain::distributions::{
    LineSplit, NormalScoreModel, SpreadProbs, TotalProbs, clamp01, neg_bin_series,
};

pub const DEFAULT_EXPONENT: f64 = 1.83;
pub const DEFAULT_OVERDISPERSION: f64 = 1.35;
pub const DEFAULT_MARGIN_STD: f64 = 2.8;
pub const DEFAULT_NEGBIN_K: f64 = 4.0;
pub const DEFAULT_INNINGS_SP: f64 = 5.5;
pub const DEFAULT_INNINGS_BP: f64 = 3.5;
pub const DEFAULT_LEAGUE_RUNS: f64 = 4.5;
const MIN_RUNS: f64 = 0.1;
const HOME_STAFF_ERA: f64 = 4.00;
const AWAY_STAFF_ERA: f64 = 4.10;

/// Distribution of the total runs scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTotals {
    /// Normal with `σ = √μ · overdispersion` and a continuity window.
    Normal,
    /// Exact negative binomial with dispersion `negbin_k`.
    #[default]
    NegBin,
}

/// Pitching research. Missing ERAs take the league staff baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchingInputs {
    #[serde(alias = "homeSP_FIP")]
    pub home_sp_fip: Option<f64>,
    #[serde(alias = "homeBullpen_ERA")]
    pub home_bullpen_era: Option<f64>,
    #[serde(alias = "awaySP_FIP")]
    pub away_sp_fip: Option<f64>,
    #[serde(alias = "awayBullpen_ERA")]
    pub away_bullpen_era: Option<f64>,
    #[serde(alias = "parkFactor")]
    pub park_factor: Option<f64>,
}

/// Innings split and run environment used to turn pitching into runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunEnvironment {
    pub innings_sp: f64,
    pub innings_bp: f64,
    /// League runs per team per game.
    pub league_runs: f64,
}

impl Default for RunEnvironment {
    fn default() -> Self {
        Self {
            innings_sp: DEFAULT_INNINGS_SP,
            innings_bp: DEFAULT_INNINGS_BP,
            league_runs: DEFAULT_LEAGUE_RUNS,
        }
    }
}

/// Runs allowed per nine from the starter's FIP and the bullpen's ERA.
pub fn blended_ra9(sp_fip: f64, bullpen_era: f64, innings_sp: f64, innings_bp: f64) -> f64 {
    sp_fip * innings_sp / 9.0 + bullpen_era * innings_bp / 9.0
}

impl PitchingInputs {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Staff RA9 for (home, away).
    pub fn ra9(&self, env: &RunEnvironment) -> (f64, f64) {
        let or = |v: Option<f64>, d: f64| v.filter(|x| x.is_finite()).unwrap_or(d);
        let home = blended_ra9(
            or(self.home_sp_fip, HOME_STAFF_ERA),
            or(self.home_bullpen_era, HOME_STAFF_ERA),
            env.innings_sp,
            env.innings_bp,
        );
        let away = blended_ra9(
            or(self.away_sp_fip, AWAY_STAFF_ERA),
            or(self.away_bullpen_era, AWAY_STAFF_ERA),
            env.innings_sp,
            env.innings_bp,
        );
        (home, away)
    }

    /// Projected (home, away) runs. A team scores more against a staff
    /// that allows more.
    pub fn project(&self, env: &RunEnvironment) -> (f64, f64) {
        let (home_ra9, away_ra9) = self.ra9(env);
        let pf = self.park_factor.filter(|x| x.is_finite() && *x > 0.0).unwrap_or(1.0);
        let league = env.league_runs.max(0.5);
        (
            env.league_runs * (away_ra9 / league) * pf,
            env.league_runs * (home_ra9 / league) * pf,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseballInputs {
    pub home_runs: f64,
    pub away_runs: f64,
    #[serde(default = "default_exponent")]
    pub exponent: f64,
    #[serde(default = "default_overdispersion")]
    pub total_overdispersion: f64,
    #[serde(default = "default_margin_std")]
    pub margin_std: f64,
    #[serde(default)]
    pub totals: RunTotals,
    #[serde(default = "default_negbin_k")]
    pub negbin_k: f64,
}

const fn default_negbin_k() -> f64 {
    DEFAULT_NEGBIN_K
}

const fn default_exponent() -> f64 {
    DEFAULT_EXPONENT
}

const fn default_overdispersion() -> f64 {
    DEFAULT_OVERDISPERSION
}

const fn default_margin_std() -> f64 {
    DEFAULT_MARGIN_STD
}

impl BaseballInputs {
    pub fn new(home_runs: f64, away_runs: f64) -> Self {
        Self {
            home_runs,
            away_runs,
            exponent: DEFAULT_EXPONENT,
            total_overdispersion: DEFAULT_OVERDISPERSION,
            margin_std: DEFAULT_MARGIN_STD,
            totals: RunTotals::NegBin,
            negbin_k: DEFAULT_NEGBIN_K,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BaseballProbs {
    pub home_win: f64,
    pub away_win: f64,
    pub predicted_total: f64,
    pub predicted_home_by: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseballModel {
    home_win: f64,
    normal: NormalScoreModel,
    totals: RunTotals,
    negbin_k: f64,
}

impl BaseballModel {
    pub fn fit(inputs: &BaseballInputs) -> Self {
        let (h0, a0) = (inputs.home_runs, inputs.away_runs);
        if !h0.is_finite() || !a0.is_finite() {
            return Self {
                home_win: f64::NAN,
                normal: NormalScoreModel::INVALID,
                totals: inputs.totals,
                negbin_k: DEFAULT_NEGBIN_K,
            };
        }
        let h = h0.max(MIN_RUNS);
        let a = a0.max(MIN_RUNS);

        let exp = safe_std(inputs.exponent, DEFAULT_EXPONENT);
        let h_pow = h.powf(exp);
        let a_pow = a.powf(exp);
        let denom = h_pow + a_pow;
        let home_win = if denom > 0.0 { h_pow / denom } else { 0.5 };

        let total_mean = h + a;
        let od = safe_std(inputs.total_overdispersion, DEFAULT_OVERDISPERSION);

        Self {
            home_win,
            normal: NormalScoreModel {
                margin_mean: h - a,
                margin_std: safe_std(inputs.margin_std, DEFAULT_MARGIN_STD),
                total_mean,
                total_std: total_mean.sqrt() * od,
            },
            totals: inputs.totals,
            negbin_k: safe_std(inputs.negbin_k, DEFAULT_NEGBIN_K),
        }
    }

    pub fn probs(&self) -> BaseballProbs {
        BaseballProbs {
            home_win: clamp01(self.home_win),
            away_win: clamp01(1.0 - self.home_win),
            predicted_total: self.normal.total_mean,
            predicted_home_by: self.normal.margin_mean,
        }
    }

    pub fn total_probs(&self, line: f64) -> TotalProbs {
        match self.totals {
            RunTotals::Normal => self.normal.total_probs(line),
            RunTotals::NegBin => {
                let mean = self.normal.total_mean;
                if !mean.is_finite() || !line.is_finite() || line < 0.0 {
                    return LineSplit::NAN.into();
                }
                let support = 30usize.max(line.floor() as usize + 15);
                let pmf = neg_bin_series(mean, self.negbin_k, support);
                LineSplit::discrete(&pmf, line).into()
            }
        }
    }

    /// Home runline, e.g. -1.5 / +1.5.
    pub fn runline_probs(&self, home_line: f64) -> SpreadProbs {
        self.normal.spread_probs(home_line)
    }
}

pub fn calc_baseball_probs(inputs: &BaseballInputs) -> BaseballProbs {
    BaseballModel::fit(inputs).probs()
}
