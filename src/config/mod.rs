//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `config.toml`. Every field has a
//! serde default, so an empty file (or no file at all) yields the stock
//! engine: quarter-Kelly capped at 10%, 8% same-match combo penalty and the
//! per-sport model priors. Model knobs live here, not in the domain layer.

pub mod loader;

use serde::Deserialize;

use crate::domain::{ComboOptions, VigMethod};
use crate::domain::models::{
  BaseballInputs, BasketballInputs, CornersInputs, DixonColesMode, EloInputs, FootballInputs,
  HockeyInputs, NflInputs, OtMode, OtModel, RunEnvironment, RunTotals, elo_weight,
};

/// Top-level engine configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the first match is evaluated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Engine identity and bankroll.
  pub engine: EngineSection,
  /// Kelly sizing and EV threshold.
  pub staking: StakingConfig,
  /// Parlay correlation handling.
  pub combo: ComboConfig,
  /// Overround removal.
  pub vig: VigConfig,
  /// Per-sport model priors.
  pub models: ModelsConfig,
}

/// Engine identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
  /// Human-readable engine name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Bankroll the stake amounts are computed against.
  #[serde(default = "default_bankroll")]
  pub bankroll: f64,
}

impl Default for EngineSection {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      bankroll: default_bankroll(),
    }
  }
}

/// Stake sizing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StakingConfig {
  /// Kelly fraction multiplier (0.25 = quarter-Kelly).
  #[serde(default = "default_kelly_fraction")]
  pub kelly_fraction: f64,
  /// Maximum stake as fraction of bankroll.
  #[serde(default = "default_kelly_cap")]
  pub kelly_cap: f64,
  /// Minimum EV (per unit stake) for a market to be recommended.
  #[serde(default)]
  pub min_ev: f64,
}

impl Default for StakingConfig {
  fn default() -> Self {
    Self {
      kelly_fraction: default_kelly_fraction(),
      kelly_cap: default_kelly_cap(),
      min_ev: 0.0,
    }
  }
}

/// Combo analyzer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ComboConfig {
  /// Detect legs sharing a match id and penalize them.
  #[serde(default = "default_true")]
  pub auto_correlation: bool,
  /// Per-leg penalty applied when same-match legs are detected.
  #[serde(default = "default_same_match_penalty")]
  pub same_match_penalty: f64,
}

impl Default for ComboConfig {
  fn default() -> Self {
    Self {
      auto_correlation: true,
      same_match_penalty: default_same_match_penalty(),
    }
  }
}

impl ComboConfig {
  /// Analyzer options; the explicit penalty stays 0 so same-match detection
  /// decides.
  pub fn options(&self) -> ComboOptions {
    ComboOptions {
      correlation_penalty: 0.0,
      auto_correlation: self.auto_correlation,
      auto_penalty_same_match: self.same_match_penalty,
    }
  }
}

/// Overround removal configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VigConfig {
  /// "auto", "proportional" or "power".
  #[serde(default)]
  pub method: VigMethod,
}

/// Model priors. Defaults match the domain model defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
  pub football_max_goals: usize,
  /// Per-team Poisson mass the grid must cover before the hard cap.
  pub football_tail_mass: f64,
  pub football_dixon_coles: DixonColesMode,
  pub football_rho: f64,
  pub football_elo_blend: bool,
  /// Elo weight once five pieces of evidence back the xG.
  pub football_elo_weight: f64,
  pub football_elo_scale: f64,
  pub corners_home: f64,
  pub corners_away: f64,
  pub corners_dispersion: f64,
  pub hockey_max_goals: usize,
  pub hockey_ot_mode: OtMode,
  pub hockey_ot_damping: f64,
  pub hockey_possession_scale: f64,
  pub hockey_goalie_scale: f64,
  pub basketball_margin_std: f64,
  pub basketball_total_std: f64,
  pub nfl_margin_std: f64,
  pub nfl_total_std: f64,
  pub nfl_tie_prob: f64,
  pub nfl_plays_per_team: f64,
  pub nfl_hfa: f64,
  pub baseball_exponent: f64,
  pub baseball_overdispersion: f64,
  pub baseball_margin_std: f64,
  pub baseball_totals: RunTotals,
  pub baseball_negbin_k: f64,
  pub baseball_innings_sp: f64,
  pub baseball_innings_bp: f64,
  pub baseball_league_runs: f64,
}

impl Default for ModelsConfig {
  fn default() -> Self {
    use crate::domain::models::{baseball, basketball, corners, football, hockey, nfl};

    Self {
      football_max_goals: football::DEFAULT_MAX_GOALS,
      football_tail_mass: football::DEFAULT_TAIL_MASS,
      football_dixon_coles: DixonColesMode::default(),
      football_rho: football::DEFAULT_RHO,
      football_elo_blend: true,
      football_elo_weight: football::DEFAULT_ELO_WEIGHT,
      football_elo_scale: football::DEFAULT_ELO_SCALE,
      corners_home: corners::DEFAULT_HOME_CORNERS,
      corners_away: corners::DEFAULT_AWAY_CORNERS,
      corners_dispersion: corners::DEFAULT_DISPERSION,
      hockey_max_goals: hockey::DEFAULT_MAX_GOALS,
      hockey_ot_mode: OtMode::default(),
      hockey_ot_damping: hockey::DEFAULT_OT_DAMPING,
      hockey_possession_scale: hockey::DEFAULT_POSSESSION_SCALE,
      hockey_goalie_scale: hockey::DEFAULT_GOALIE_SCALE,
      basketball_margin_std: basketball::DEFAULT_MARGIN_STD,
      basketball_total_std: basketball::DEFAULT_TOTAL_STD,
      nfl_margin_std: nfl::DEFAULT_MARGIN_STD,
      nfl_total_std: nfl::DEFAULT_TOTAL_STD,
      nfl_tie_prob: nfl::DEFAULT_TIE_PROB,
      nfl_plays_per_team: nfl::DEFAULT_PLAYS_PER_TEAM,
      nfl_hfa: nfl::DEFAULT_HFA,
      baseball_exponent: baseball::DEFAULT_EXPONENT,
      baseball_overdispersion: baseball::DEFAULT_OVERDISPERSION,
      baseball_margin_std: baseball::DEFAULT_MARGIN_STD,
      baseball_totals: RunTotals::default(),
      baseball_negbin_k: baseball::DEFAULT_NEGBIN_K,
      baseball_innings_sp: baseball::DEFAULT_INNINGS_SP,
      baseball_innings_bp: baseball::DEFAULT_INNINGS_BP,
      baseball_league_runs: baseball::DEFAULT_LEAGUE_RUNS,
    }
  }
}

impl ModelsConfig {
  /// Football inputs carrying the configured grid and Dixon–Coles setup.
  pub fn football(&self, home_xg: f64, away_xg: f64) -> FootballInputs {
    FootballInputs {
      max_goals: self.football_max_goals,
      tail_mass_target: Some(self.football_tail_mass),
      dixon_coles: self.football_dixon_coles,
      rho: self.football_rho,
      ..FootballInputs::new(home_xg, away_xg)
    }
  }

  /// Elo blend for a rated fixture, `None` when blending is disabled.
  pub fn elo(&self, home: f64, away: f64, evidence: usize) -> Option<EloInputs> {
    self.football_elo_blend.then(|| EloInputs {
      home,
      away,
      weight: elo_weight(evidence, self.football_elo_weight),
      scale: self.football_elo_scale,
    })
  }

  pub fn corners(&self, home_avg: Option<f64>, away_avg: Option<f64>) -> CornersInputs {
    CornersInputs {
      home_avg: home_avg.unwrap_or(self.corners_home),
      away_avg: away_avg.unwrap_or(self.corners_away),
      dispersion: self.corners_dispersion,
    }
  }

  pub fn hockey(&self, home_xg: f64, away_xg: f64) -> HockeyInputs {
    HockeyInputs {
      max_goals: self.hockey_max_goals,
      ot_model: OtModel {
        mode: self.hockey_ot_mode,
        home_share_override: None,
        damping: self.hockey_ot_damping,
      },
      possession_scale: self.hockey_possession_scale,
      goalie_scale: self.hockey_goalie_scale,
      ..HockeyInputs::new(home_xg, away_xg)
    }
  }

  pub fn basketball(&self, home_points: f64, away_points: f64) -> BasketballInputs {
    BasketballInputs {
      margin_std: self.basketball_margin_std,
      total_std: self.basketball_total_std,
      ..BasketballInputs::new(home_points, away_points)
    }
  }

  pub fn nfl(&self, home_points: f64, away_points: f64) -> NflInputs {
    NflInputs {
      margin_std: self.nfl_margin_std,
      total_std: self.nfl_total_std,
      tie_prob: self.nfl_tie_prob,
      ..NflInputs::new(home_points, away_points)
    }
  }

  pub fn baseball(&self, home_runs: f64, away_runs: f64) -> BaseballInputs {
    BaseballInputs {
      exponent: self.baseball_exponent,
      total_overdispersion: self.baseball_overdispersion,
      margin_std: self.baseball_margin_std,
      totals: self.baseball_totals,
      negbin_k: self.baseball_negbin_k,
      ..BaseballInputs::new(home_runs, away_runs)
    }
  }

  pub fn run_environment(&self) -> RunEnvironment {
    RunEnvironment {
      innings_sp: self.baseball_innings_sp,
      innings_bp: self.baseball_innings_bp,
      league_runs: self.baseball_league_runs,
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "sports-edge".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_bankroll() -> f64 {
  300.0
}

fn default_true() -> bool {
  true
}

fn default_kelly_fraction() -> f64 {
  0.25
}

fn default_kelly_cap() -> f64 {
  0.10
}

fn default_same_match_penalty() -> f64 {
  0.08
}
