//! Sports Edge Engine — Batch Runner
//!
//! Evaluates a JSON slate of matches and prints the priced boards.
//!
//! Usage: `sports-edge <matches.json> [config.toml]`
//!
//! Wiring sequence:
//! 1. Load config.toml + validate (defaults when the file is absent)
//! 2. Init tracing (JSON structured logging on stderr)
//! 3. Read the match slate
//! 4. Evaluate the batch
//! 5. Print the result map as pretty JSON on stdout

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use sports_edge_engine::config::{self, EngineConfig};
use sports_edge_engine::usecases::{MatchEvaluator, MatchInput};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(matches_path) = args.next() else {
        bail!("usage: sports-edge <matches.json> [config.toml]");
    };
    let config_path = args.next();

    // ── 1. Load configuration ───────────────────────────────
    let config = load_engine_config(config_path.as_deref())?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.engine.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        name = %config.engine.name,
        version = env!("CARGO_PKG_VERSION"),
        bankroll = config.engine.bankroll,
        "Starting sports edge engine"
    );

    // ── 3. Read the slate ───────────────────────────────────
    let content = std::fs::read_to_string(&matches_path)
        .with_context(|| format!("Failed to read matches file: {matches_path}"))?;
    let matches: Vec<MatchInput> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse matches file: {matches_path}"))?;

    // ── 4. Evaluate ─────────────────────────────────────────
    let evaluator = MatchEvaluator::new(&config);
    let results = evaluator.evaluate_batch(&matches);

    // ── 5. Emit ─────────────────────────────────────────────
    let out = serde_json::to_string_pretty(&results).context("Failed to serialize results")?;
    println!("{out}");

    Ok(())
}

/// Explicit paths must exist; the default path falls back to built-in
/// defaults when missing.
fn load_engine_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(p) => config::loader::load_config(p).context("Failed to load configuration"),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            config::loader::load_config(DEFAULT_CONFIG_PATH).context("Failed to load configuration")
        }
        None => Ok(EngineConfig::default()),
    }
}
