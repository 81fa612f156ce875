//! Shared numerics for the sport models.
//!
//! - Abramowitz & Stegun 7.1.26 `erf` (max abs error ~1.5e-7) and the
//!   Normal CDF / survival function built on it.
//! - Poisson PMF via forward recursion `p(k) = p(k-1) * λ / k`, which never
//!   touches a factorial and so cannot overflow.
//! - Negative binomial PMF for overdispersed counts (runs, corners).
//! - A truncated joint score grid for Poisson scoring (football, hockey) with
//!   mass accounting and an optional Dixon–Coles low-score correction.
//! - Push-aware evaluation of spread/total lines under a Normal margin/total.

use serde::{Deserialize, Serialize};

/// Hard cap on per-team goals in a score grid.
pub const MAX_GRID_GOALS: usize = 20;

/// Tolerance used when deciding whether a line is whole or half.
const LINE_TOLERANCE: f64 = 1e-9;

/// Clamp into [0, 1]. NaN passes through untouched so that invalid model
/// inputs stay visibly invalid downstream.
pub fn clamp01(p: f64) -> f64 {
    if p < 0.0 {
        0.0
    } else if p > 1.0 {
        1.0
    } else {
        p
    }
}

/// Error function, A&S 7.1.26.
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t) * (-x * x).exp();

    sign * y
}

/// Normal CDF `P(X <= x)` for `X ~ N(mean, std²)`.
///
/// Returns NaN when any argument is non-finite or `std <= 0`.
pub fn normal_cdf(x: f64, mean: f64, std: f64) -> f64 {
    if !x.is_finite() || !mean.is_finite() || !std.is_finite() || std <= 0.0 {
        return f64::NAN;
    }
    let z = (x - mean) / std;
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Normal survival function `P(X > x)`.
pub fn normal_sf(x: f64, mean: f64, std: f64) -> f64 {
    1.0 - normal_cdf(x, mean, std)
}

/// True when `line` is a whole number (within tolerance).
pub fn is_integer_line(line: f64) -> bool {
    line.is_finite() && (line - line.round()).abs() < LINE_TOLERANCE
}

/// True when `line` sits exactly on a half point (x.5).
pub fn is_half_line(line: f64) -> bool {
    line.is_finite() && ((line - line.round()).abs() - 0.5).abs() < LINE_TOLERANCE
}

/// Poisson PMF for k = 0..=max_k, via stable forward recursion.
pub fn poisson_series(lambda: f64, max_k: usize) -> Vec<f64> {
    let lambda = lambda.max(0.0);
    let mut pmf = Vec::with_capacity(max_k + 1);
    pmf.push((-lambda).exp());
    for k in 1..=max_k {
        let prev = pmf[k - 1];
        pmf.push(prev * lambda / k as f64);
    }
    pmf
}

/// Negative binomial PMF for x = 0..=max_k with the given mean and
/// dispersion `k` (variance `μ + μ²/k`; `k → ∞` is Poisson).
///
/// Both parameters are floored at 0.01.
pub fn neg_bin_series(mean: f64, dispersion: f64, max_k: usize) -> Vec<f64> {
    let mean = if mean.is_finite() { mean.max(0.01) } else { 0.01 };
    let r = if dispersion.is_finite() { dispersion.max(0.01) } else { 0.01 };
    let p = r / (r + mean);
    let q = 1.0 - p;

    let mut pmf = Vec::with_capacity(max_k + 1);
    pmf.push(p.powf(r));
    for x in 1..=max_k {
        let prev = pmf[x - 1];
        let x = x as f64;
        pmf.push(prev * q * (x + r - 1.0) / x);
    }
    pmf
}

/// Smallest per-team goal cap (at least 6, at most `hard_cap`) whose Poisson
/// CDF reaches `target`. Falls back to `hard_cap`.
pub fn adaptive_k_max(lambda: f64, target: f64, hard_cap: usize) -> usize {
    let lambda = if lambda.is_finite() { lambda.max(0.0) } else { 0.0 };
    let pmf = poisson_series(lambda, hard_cap);
    let mut cdf = 0.0;
    for (k, p) in pmf.iter().enumerate() {
        cdf += p;
        if k >= 6 && cdf >= target {
            return k;
        }
    }
    hard_cap
}

/// Dixon–Coles correction factor for the low-score cells. Every other cell
/// is left alone.
pub fn dixon_coles_tau(home: usize, away: usize, lambda_home: f64, lambda_away: f64, rho: f64) -> f64 {
    match (home, away) {
        (0, 0) => 1.0 - lambda_home * lambda_away * rho,
        (0, 1) => 1.0 + lambda_home * rho,
        (1, 0) => 1.0 + lambda_away * rho,
        (1, 1) => 1.0 - rho,
        _ => 1.0,
    }
}

/// Elo expected score of `rating` against `opponent`:
/// `1 / (1 + 10^((opponent − rating) / scale))`.
pub fn elo_win_prob(rating: f64, opponent: f64, scale: f64) -> f64 {
    if !rating.is_finite() || !opponent.is_finite() || !scale.is_finite() || scale <= 0.0 {
        return f64::NAN;
    }
    1.0 / (1.0 + 10f64.powf((opponent - rating) / scale))
}

// ────────────────────────────────────────────
// Push-aware line outcomes
// ────────────────────────────────────────────

/// Three-way split of a line bet: above the line, exactly on it, below it.
///
/// For spreads "above" is a home cover; for totals it is the over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSplit {
    pub above: f64,
    pub push: f64,
    pub below: f64,
}

impl LineSplit {
    /// All-NaN split for invalid inputs.
    pub const NAN: Self = Self {
        above: f64::NAN,
        push: f64::NAN,
        below: f64::NAN,
    };

    /// Split for `X` against `threshold` under `N(mean, std²)`.
    ///
    /// Half lines cannot push, so `above = SF(threshold)`. Whole lines use a
    /// continuity window `[threshold - 0.5, threshold + 0.5]` whose mass is
    /// the push; `above + push + below = 1`.
    pub fn normal(threshold: f64, mean: f64, std: f64) -> Self {
        if !threshold.is_finite() {
            return Self::NAN;
        }

        if !is_integer_line(threshold) {
            let above = clamp01(normal_sf(threshold, mean, std));
            return Self {
                above,
                push: 0.0,
                below: clamp01(1.0 - above),
            };
        }

        let lo = normal_cdf(threshold - 0.5, mean, std);
        let hi = normal_cdf(threshold + 0.5, mean, std);

        let push = clamp01(hi - lo);
        let above = clamp01(1.0 - hi);
        let below = clamp01(1.0 - above - push);

        Self { above, push, below }
    }

    /// Split for a discrete count with PMF `pmf` (index = count).
    ///
    /// Mass beyond the truncated support counts as above the line, so
    /// `above = 1 − below − push`.
    pub fn discrete(pmf: &[f64], line: f64) -> Self {
        if !line.is_finite() || pmf.is_empty() {
            return Self::NAN;
        }
        let (mut below, mut push) = (0.0, 0.0);
        for (x, p) in pmf.iter().enumerate() {
            let d = x as f64 - line;
            if d.abs() < LINE_TOLERANCE {
                push += p;
            } else if d < 0.0 {
                below += p;
            }
        }
        let below = clamp01(below);
        let push = clamp01(push);
        Self {
            above: clamp01(1.0 - below - push),
            push,
            below,
        }
    }

    /// Sum of the three parts (1 for any valid split).
    pub fn total(&self) -> f64 {
        self.above + self.push + self.below
    }
}

/// Home spread outcome. Home covers when `margin + line > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadProbs {
    pub cover: f64,
    pub push: f64,
    pub no_cover: f64,
}

impl From<LineSplit> for SpreadProbs {
    fn from(split: LineSplit) -> Self {
        Self {
            cover: split.above,
            push: split.push,
            no_cover: split.below,
        }
    }
}

/// Totals outcome. Over wins when `total > line`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalProbs {
    pub over: f64,
    pub push: f64,
    pub under: f64,
}

impl From<LineSplit> for TotalProbs {
    fn from(split: LineSplit) -> Self {
        Self {
            over: split.above,
            push: split.push,
            under: split.below,
        }
    }
}

// ────────────────────────────────────────────
// Normal margin/total model
// ────────────────────────────────────────────

/// Normal approximation of home margin (home − away) and total (home + away).
///
/// Shared by basketball, NFL and baseball. Query methods are pure functions of
/// the fitted parameters and the market line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalScoreModel {
    pub margin_mean: f64,
    pub margin_std: f64,
    pub total_mean: f64,
    pub total_std: f64,
}

impl NormalScoreModel {
    /// Model whose every query yields NaN.
    pub const INVALID: Self = Self {
        margin_mean: f64::NAN,
        margin_std: f64::NAN,
        total_mean: f64::NAN,
        total_std: f64::NAN,
    };

    /// Push-aware home spread probabilities for the book line on HOME
    /// (e.g. -3.5, +7).
    pub fn spread_probs(&self, home_line: f64) -> SpreadProbs {
        LineSplit::normal(-home_line, self.margin_mean, self.margin_std).into()
    }

    /// Push-aware totals probabilities.
    pub fn total_probs(&self, line: f64) -> TotalProbs {
        LineSplit::normal(line, self.total_mean, self.total_std).into()
    }

    /// `P(margin > 0)` under the continuous approximation.
    pub fn home_margin_positive(&self) -> f64 {
        clamp01(normal_sf(0.0, self.margin_mean, self.margin_std))
    }
}

// ────────────────────────────────────────────
// Poisson score grid
// ────────────────────────────────────────────

/// Most likely exact score in a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreline {
    pub home: usize,
    pub away: usize,
}

/// Truncated joint distribution of Poisson scores.
///
/// Cells are `p_home(x) · p_away(y) · τ(x, y)`, where `τ` is the Dixon–Coles
/// factor (identically 1 when `rho` is 0) and negative cells are clipped to
/// zero. `mass_covered` is the raw probability captured before
/// renormalization; every query divides by it so aggregates sum to exactly 1.
#[derive(Debug, Clone)]
pub struct ScoreGrid {
    lambda_home: f64,
    lambda_away: f64,
    rho: f64,
    home_pmf: Vec<f64>,
    away_pmf: Vec<f64>,
    mass_covered: f64,
}

impl ScoreGrid {
    /// Independent square grid, capping `max_goals` at [`MAX_GRID_GOALS`].
    pub fn new(lambda_home: f64, lambda_away: f64, max_goals: usize) -> Self {
        Self::shaped(lambda_home, lambda_away, max_goals, max_goals, 0.0)
    }

    /// Grid with per-team caps and a Dixon–Coles `rho` (0 = independent).
    /// A non-finite `rho` is treated as 0.
    pub fn shaped(
        lambda_home: f64,
        lambda_away: f64,
        home_max: usize,
        away_max: usize,
        rho: f64,
    ) -> Self {
        let rho = if rho.is_finite() { rho } else { 0.0 };
        let mut grid = Self {
            lambda_home,
            lambda_away,
            rho,
            home_pmf: poisson_series(lambda_home, home_max.min(MAX_GRID_GOALS)),
            away_pmf: poisson_series(lambda_away, away_max.min(MAX_GRID_GOALS)),
            mass_covered: 0.0,
        };
        grid.mass_covered = grid.cells().map(|(_, _, p)| p).sum();
        grid
    }

    /// Larger of the two per-team caps.
    pub fn max_goals(&self) -> usize {
        self.home_max().max(self.away_max())
    }

    pub fn home_max(&self) -> usize {
        self.home_pmf.len() - 1
    }

    pub fn away_max(&self) -> usize {
        self.away_pmf.len() - 1
    }

    pub fn rho(&self) -> f64 {
        self.rho
    }

    pub fn mass_covered(&self) -> f64 {
        self.mass_covered
    }

    /// Marginal home PMF (untruncated-normalized).
    pub fn home_pmf(&self) -> &[f64] {
        &self.home_pmf
    }

    /// Marginal away PMF (untruncated-normalized).
    pub fn away_pmf(&self) -> &[f64] {
        &self.away_pmf
    }

    fn norm(&self) -> f64 {
        if self.mass_covered > 0.0 {
            1.0 / self.mass_covered
        } else {
            1.0
        }
    }

    /// Raw (un-normalized) joint probability of an exact score. Scores off
    /// the grid are 0.
    pub fn raw(&self, home: usize, away: usize) -> f64 {
        match (self.home_pmf.get(home), self.away_pmf.get(away)) {
            (Some(px), Some(py)) => self.cell(home, away, px * py),
            _ => 0.0,
        }
    }

    fn cell(&self, home: usize, away: usize, independent: f64) -> f64 {
        if self.rho == 0.0 {
            return independent;
        }
        let tau = dixon_coles_tau(home, away, self.lambda_home, self.lambda_away, self.rho);
        (independent * tau).max(0.0)
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.home_pmf.iter().enumerate().flat_map(move |(x, px)| {
            self.away_pmf
                .iter()
                .enumerate()
                .map(move |(y, py)| (x, y, self.cell(x, y, px * py)))
        })
    }

    /// Normalized sum of the cells matching `pred`.
    pub fn sum_where(&self, pred: impl Fn(usize, usize) -> bool) -> f64 {
        let s: f64 = self
            .cells()
            .filter(|(x, y, _)| pred(*x, *y))
            .map(|(_, _, p)| p)
            .sum();
        clamp01(s * self.norm())
    }

    /// Highest-probability exact score.
    pub fn most_likely_score(&self) -> Scoreline {
        let mut best = -1.0;
        let mut score = Scoreline { home: 0, away: 0 };
        for (x, y, p) in self.cells() {
            if p > best {
                best = p;
                score = Scoreline { home: x, away: y };
            }
        }
        score
    }

    /// Full normalized matrix, indexed `[home][away]`.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        let norm = self.norm();
        self.home_pmf
            .iter()
            .enumerate()
            .map(|(x, px)| {
                self.away_pmf
                    .iter()
                    .enumerate()
                    .map(|(y, py)| self.cell(x, y, px * py) * norm)
                    .collect()
            })
            .collect()
    }

    /// `P(total > line)` for any line.
    pub fn over_prob(&self, line: f64) -> f64 {
        if !line.is_finite() {
            return f64::NAN;
        }
        self.sum_where(|x, y| (x + y) as f64 > line)
    }

    /// Exact push-aware totals split over the discrete grid.
    pub fn total_split(&self, line: f64) -> LineSplit {
        if !line.is_finite() {
            return LineSplit::NAN;
        }
        self.split_by(|x, y| (x + y) as f64 - line)
    }

    /// Exact push-aware handicap split for the HOME line: home covers when
    /// `home - away + line > 0`.
    pub fn handicap_split(&self, home_line: f64) -> LineSplit {
        if !home_line.is_finite() {
            return LineSplit::NAN;
        }
        self.split_by(|x, y| x as f64 - y as f64 + home_line)
    }

    fn split_by(&self, signed: impl Fn(usize, usize) -> f64) -> LineSplit {
        let (mut above, mut push, mut below) = (0.0, 0.0, 0.0);
        for (x, y, p) in self.cells() {
            let d = signed(x, y);
            if d.abs() < LINE_TOLERANCE {
                push += p;
            } else if d > 0.0 {
                above += p;
            } else {
                below += p;
            }
        }
        let norm = self.norm();
        LineSplit {
            above: clamp01(above * norm),
            push: clamp01(push * norm),
            below: clamp01(below * norm),
        }
    }
}
