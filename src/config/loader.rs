//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::EngineConfig;
use crate::domain::distributions::MAX_GRID_GOALS;

/// Load and validate configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  load_config_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

/// Parse and validate configuration from an in-memory TOML string.
///
/// # Errors
/// Fails on TOML syntax errors, unknown enum values or a violated
/// validation rule.
pub fn load_config_str(content: &str) -> Result<EngineConfig> {
  let config: EngineConfig = toml::from_str(content).context("Failed to parse config TOML")?;

  validate_config(&config)?;

  info!(
    name = %config.engine.name,
    bankroll = config.engine.bankroll,
    kelly = config.staking.kelly_fraction,
    cap = config.staking.kelly_cap,
    min_ev = config.staking.min_ev,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Fractions and caps in (0, 1]
/// - Positive standard deviations and exponents
/// - Grid sizes the score grid supports
/// - Non-negative bankroll
fn validate_config(config: &EngineConfig) -> Result<()> {
  // Engine validation
  anyhow::ensure!(
    config.engine.bankroll.is_finite() && config.engine.bankroll >= 0.0,
    "bankroll must be >= 0, got {}",
    config.engine.bankroll
  );

  // Staking validation
  let staking = &config.staking;
  anyhow::ensure!(
    staking.kelly_fraction > 0.0 && staking.kelly_fraction <= 1.0,
    "Kelly fraction must be in (0, 1], got {}",
    staking.kelly_fraction
  );
  anyhow::ensure!(
    staking.kelly_cap > 0.0 && staking.kelly_cap <= 1.0,
    "Kelly cap must be in (0, 1], got {}",
    staking.kelly_cap
  );
  anyhow::ensure!(
    staking.min_ev.is_finite(),
    "min_ev must be finite, got {}",
    staking.min_ev
  );

  // Combo validation
  anyhow::ensure!(
    config.combo.same_match_penalty >= 0.0 && config.combo.same_match_penalty < 1.0,
    "same_match_penalty must be in [0, 1), got {}",
    config.combo.same_match_penalty
  );

  // Model validation
  let models = &config.models;
  for (name, goals) in [
    ("football_max_goals", models.football_max_goals),
    ("hockey_max_goals", models.hockey_max_goals),
  ] {
    anyhow::ensure!(
      (1..=MAX_GRID_GOALS).contains(&goals),
      "{name} must be in [1, {MAX_GRID_GOALS}], got {goals}"
    );
  }

  for (name, value) in [
    ("basketball_margin_std", models.basketball_margin_std),
    ("basketball_total_std", models.basketball_total_std),
    ("nfl_margin_std", models.nfl_margin_std),
    ("nfl_total_std", models.nfl_total_std),
    ("baseball_exponent", models.baseball_exponent),
    ("baseball_overdispersion", models.baseball_overdispersion),
    ("baseball_margin_std", models.baseball_margin_std),
    ("baseball_negbin_k", models.baseball_negbin_k),
    ("baseball_innings_sp", models.baseball_innings_sp),
    ("baseball_innings_bp", models.baseball_innings_bp),
    ("baseball_league_runs", models.baseball_league_runs),
    ("football_elo_scale", models.football_elo_scale),
    ("corners_home", models.corners_home),
    ("corners_away", models.corners_away),
    ("corners_dispersion", models.corners_dispersion),
    ("nfl_plays_per_team", models.nfl_plays_per_team),
  ] {
    anyhow::ensure!(
      value.is_finite() && value > 0.0,
      "{name} must be positive, got {value}"
    );
  }

  anyhow::ensure!(
    models.hockey_ot_damping >= 0.0 && models.hockey_ot_damping <= 1.0,
    "hockey_ot_damping must be in [0, 1], got {}",
    models.hockey_ot_damping
  );
  anyhow::ensure!(
    models.football_tail_mass > 0.0 && models.football_tail_mass <= 1.0,
    "football_tail_mass must be in (0, 1], got {}",
    models.football_tail_mass
  );
  anyhow::ensure!(
    models.football_rho.abs() < 1.0,
    "football_rho must be in (-1, 1), got {}",
    models.football_rho
  );
  anyhow::ensure!(
    (0.0..=0.9).contains(&models.football_elo_weight),
    "football_elo_weight must be in [0, 0.9], got {}",
    models.football_elo_weight
  );
  for (name, value) in [
    ("hockey_possession_scale", models.hockey_possession_scale),
    ("hockey_goalie_scale", models.hockey_goalie_scale),
  ] {
    anyhow::ensure!(
      value.is_finite() && value >= 0.0,
      "{name} must be >= 0, got {value}"
    );
  }
  anyhow::ensure!(
    models.nfl_hfa.is_finite(),
    "nfl_hfa must be finite, got {}",
    models.nfl_hfa
  );
  anyhow::ensure!(
    models.nfl_tie_prob >= 0.0 && models.nfl_tie_prob < 0.2,
    "nfl_tie_prob must be in [0, 0.2), got {}",
    models.nfl_tie_prob
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::VigMethod;
  use crate::domain::models::{DixonColesMode, OtMode, RunTotals};

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_empty_config_uses_defaults() {
    let config = load_config_str("").unwrap();
    assert_eq!(config.engine.bankroll, 300.0);
    assert_eq!(config.engine.log_level, "info");
    assert_eq!(config.staking.kelly_fraction, 0.25);
    assert_eq!(config.staking.kelly_cap, 0.10);
    assert!(config.combo.auto_correlation);
    assert_eq!(config.combo.same_match_penalty, 0.08);
    assert_eq!(config.vig.method, VigMethod::Auto);
    assert_eq!(config.models.football_max_goals, 10);
    assert_eq!(config.models.hockey_max_goals, 12);
    assert_eq!(config.models.nfl_tie_prob, 0.005);
    assert_eq!(config.models.football_dixon_coles, DixonColesMode::Auto);
    assert_eq!(config.models.football_rho, -0.03);
    assert_eq!(config.models.baseball_totals, RunTotals::NegBin);
    assert_eq!(config.models.nfl_plays_per_team, 62.0);
  }

  #[test]
  fn test_model_extensions_parse() {
    let config = load_config_str(
      r#"
[models]
football_dixon_coles = "off"
football_elo_blend = false
baseball_totals = "normal"
corners_dispersion = 3.0
"#,
    )
    .unwrap();
    let m = &config.models;
    assert_eq!(m.football(1.0, 1.0).dixon_coles, DixonColesMode::Off);
    assert_eq!(m.football(1.0, 1.0).tail_mass_target, Some(0.9995));
    assert!(m.elo(1600.0, 1500.0, 3).is_none());
    assert_eq!(m.baseball(4.0, 4.0).totals, RunTotals::Normal);
    assert_eq!(m.corners(Some(6.0), None).away_avg, 4.5);
    assert_eq!(m.corners(None, None).dispersion, 3.0);

    let elo = EngineConfig::default().models.elo(1600.0, 1500.0, 5).unwrap();
    assert!((elo.weight - 0.30).abs() < 1e-12);
    assert_eq!(elo.scale, 400.0);
  }

  #[test]
  fn test_partial_sections() {
    let config = load_config_str(
      r#"
[staking]
kelly_fraction = 0.5

[vig]
method = "power"

[models]
hockey_ot_mode = "xg_share"
basketball_total_std = 19.0
"#,
    )
    .unwrap();
    assert_eq!(config.staking.kelly_fraction, 0.5);
    assert_eq!(config.staking.kelly_cap, 0.10);
    assert_eq!(config.vig.method, VigMethod::Power);
    assert_eq!(config.models.hockey_ot_mode, OtMode::XgShare);
    assert_eq!(config.models.basketball_total_std, 19.0);
    assert_eq!(config.models.basketball_margin_std, 12.0);

    let inputs = config.models.hockey(3.1, 2.6);
    assert_eq!(inputs.ot_model.mode, OtMode::XgShare);
    assert_eq!(inputs.max_goals, 12);
  }

  #[test]
  fn test_rejects_out_of_range() {
    assert!(load_config_str("[staking]\nkelly_fraction = 0.0").is_err());
    assert!(load_config_str("[staking]\nkelly_cap = 1.5").is_err());
    assert!(load_config_str("[engine]\nbankroll = -1.0").is_err());
    assert!(load_config_str("[models]\nfootball_max_goals = 40").is_err());
    assert!(load_config_str("[models]\nnfl_margin_std = 0.0").is_err());
    assert!(load_config_str("[combo]\nsame_match_penalty = 1.0").is_err());
    assert!(load_config_str("[models]\nfootball_tail_mass = 1.5").is_err());
    assert!(load_config_str("[models]\nfootball_rho = -1.0").is_err());
    assert!(load_config_str("[models]\nfootball_elo_weight = 0.95").is_err());
    assert!(load_config_str("[models]\nbaseball_negbin_k = 0.0").is_err());
    assert!(load_config_str("[models]\nhockey_goalie_scale = -1.0").is_err());
  }

  #[test]
  fn test_rejects_unknown_enum() {
    assert!(load_config_str("[vig]\nmethod = \"shin\"").is_err());
  }
}
