//! Tennis: hierarchical Markov chain from serve points to the match.
//!
//! - Game: O'Malley closed form for the server.
//! - Tiebreak: memoized recursion over point scores, first to 7 by 2, with
//!   the A, BB, AA, ... serve rotation. Scores past 20 are settled by the
//!   current leader so the recursion is bounded.
//! - Set: memoized recursion over game scores, tiebreak at 6-6, player 1
//!   serving when the games played are even.
//! - Match: best of 3 (or 5) over independent sets.
//!
//! Memo tables live on the stack of each top-level call.

use serde::{Deserialize, Serialize};

use crate::domain::distributions::clamp01;
use crate::domain::probability::parse_prob_f64;

pub const DEFAULT_SERVE_HOLD: f64 = 0.65;

const SET_STATES: usize = 8;
const TB_CAP: usize = 20;
const TB_STATES: usize = TB_CAP + 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerServeStats {
    /// Probability of winning a point on own serve (0.70 or 70).
    #[serde(default)]
    pub serve_hold: Option<f64>,
}

impl PlayerServeStats {
    pub fn new(serve_hold: f64) -> Self {
        Self {
            serve_hold: Some(serve_hold),
        }
    }

    fn point_prob(&self) -> f64 {
        self.serve_hold
            .map(parse_prob_f64)
            .filter(|p| *p > 0.0)
            .unwrap_or(DEFAULT_SERVE_HOLD)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TennisInputs {
    #[serde(alias = "p1Stats")]
    pub p1: PlayerServeStats,
    #[serde(alias = "p2Stats")]
    pub p2: PlayerServeStats,
}

impl TennisInputs {
    pub fn new(p1_serve: f64, p2_serve: f64) -> Self {
        Self {
            p1: PlayerServeStats::new(p1_serve),
            p2: PlayerServeStats::new(p2_serve),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TennisProbs {
    /// Best-of-3 match probability for player 1.
    pub p1_win: f64,
    pub p2_win: f64,
    pub set_prob: f64,
    pub tiebreak_prob: f64,
    pub p1_hold_prob: f64,
    pub p2_hold_prob: f64,
    pub p1_win_best_of_5: f64,
}

/// Server's probability of holding given point-on-serve probability `p`.
pub fn game_win_prob(p: f64) -> f64 {
    let p = clamp01(p);
    let q = 1.0 - p;
    let p4 = p.powi(4);
    let reach_deuce = 20.0 * p.powi(3) * q.powi(3);
    let win_from_deuce = (p * p) / (p * p + q * q);
    let no_deuce = p4 * (1.0 + 4.0 * q + 10.0 * q * q);
    clamp01(no_deuce + reach_deuce * win_from_deuce)
}

struct TiebreakSolver {
    p1_serve: f64,
    p2_serve: f64,
    memo: [[Option<f64>; TB_STATES]; TB_STATES],
}

impl TiebreakSolver {
    fn new(p1_serve: f64, p2_serve: f64) -> Self {
        Self {
            p1_serve,
            p2_serve,
            memo: [[None; TB_STATES]; TB_STATES],
        }
    }

    fn solve(&mut self, t1: usize, t2: usize) -> f64 {
        if t1 >= 7 && t1 >= t2 + 2 {
            return 1.0;
        }
        if t2 >= 7 && t2 >= t1 + 2 {
            return 0.0;
        }
        if t1 > TB_CAP || t2 > TB_CAP {
            return if t1 > t2 { 1.0 } else { 0.0 };
        }
        if let Some(p) = self.memo[t1][t2] {
            return p;
        }

        let p1_serving = matches!((t1 + t2) % 4, 0 | 3);
        let win_point = if p1_serving {
            self.p1_serve
        } else {
            1.0 - self.p2_serve
        };

        let p = win_point * self.solve(t1 + 1, t2) + (1.0 - win_point) * self.solve(t1, t2 + 1);
        self.memo[t1][t2] = Some(p);
        p
    }
}

struct SetSolver {
    p1_hold: f64,
    p2_hold: f64,
    tiebreak: f64,
    memo: [[Option<f64>; SET_STATES]; SET_STATES],
}

impl SetSolver {
    fn solve(&mut self, s1: usize, s2: usize) -> f64 {
        if s1 == 6 && s2 <= 4 {
            return 1.0;
        }
        if s2 == 6 && s1 <= 4 {
            return 0.0;
        }
        if s1 == 7 {
            return 1.0;
        }
        if s2 == 7 {
            return 0.0;
        }
        if s1 == 6 && s2 == 6 {
            return self.tiebreak;
        }
        if let Some(p) = self.memo[s1][s2] {
            return p;
        }

        let win_game = if (s1 + s2) % 2 == 0 {
            self.p1_hold
        } else {
            1.0 - self.p2_hold
        };

        let p = win_game * self.solve(s1 + 1, s2) + (1.0 - win_game) * self.solve(s1, s2 + 1);
        self.memo[s1][s2] = Some(p);
        p
    }
}

/// Player 1's tiebreak probability, player 1 serving first.
pub fn tiebreak_win_prob(p1_serve: f64, p2_serve: f64) -> f64 {
    clamp01(TiebreakSolver::new(clamp01(p1_serve), clamp01(p2_serve)).solve(0, 0))
}

/// Player 1's set probability, player 1 serving first.
pub fn set_win_prob(p1_serve: f64, p2_serve: f64) -> f64 {
    let mut solver = SetSolver {
        p1_hold: game_win_prob(p1_serve),
        p2_hold: game_win_prob(p2_serve),
        tiebreak: tiebreak_win_prob(p1_serve, p2_serve),
        memo: [[None; SET_STATES]; SET_STATES],
    };
    clamp01(solver.solve(0, 0))
}

/// Best of 3: `s² + 2·s²·(1 − s)`.
pub fn best_of_3(s: f64) -> f64 {
    let l = 1.0 - s;
    clamp01(s * s + s * l * s + l * s * s)
}

/// Best of 5: `s³·(1 + 3(1 − s) + 6(1 − s)²)`.
pub fn best_of_5(s: f64) -> f64 {
    let l = 1.0 - s;
    clamp01(s.powi(3) * (1.0 + 3.0 * l + 6.0 * l * l))
}

pub fn calc_tennis_probs(inputs: &TennisInputs) -> TennisProbs {
    let p1 = inputs.p1.point_prob();
    let p2 = inputs.p2.point_prob();

    let set_prob = set_win_prob(p1, p2);
    let p1_win = best_of_3(set_prob);

    TennisProbs {
        p1_win,
        p2_win: clamp01(1.0 - p1_win),
        set_prob,
        tiebreak_prob: tiebreak_win_prob(p1, p2),
        p1_hold_prob: game_win_prob(p1),
        p2_hold_prob: game_win_prob(p2),
        p1_win_best_of_5: best_of_5(set_prob),
    }
}
