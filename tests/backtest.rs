//! Backtest Framework - Synthetic Slate Simulation
//!
//! Replays a deterministic slate of football matches with known final
//! scores through the full pipeline (odds flattening, model, EV, Kelly)
//! and settles every recommended selection against the result. Validates
//! bet selection, push handling, stake caps and bankroll accounting.

use serde_json::json;

use sports_edge_engine::config::EngineConfig;
use sports_edge_engine::domain::models::FootballModel;
use sports_edge_engine::usecases::{
    Level, Market, MatchEvaluator, MatchInput, ProjectedInputs, Recommendation,
};

/// A single historical fixture for backtesting.
#[derive(Debug, Clone)]
struct HistoricalMatch {
    input: MatchInput,
    /// Final score (home, away).
    final_score: (u32, u32),
}

/// How a settled selection paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    Won,
    Push,
    Lost,
}

/// Backtest result summary.
#[derive(Debug)]
struct BacktestResult {
    /// Recommended selections that were staked.
    total_bets: usize,
    wins: usize,
    pushes: usize,
    losses: usize,
    /// Sum of stakes placed.
    total_staked: f64,
    /// Net profit over the slate.
    total_pnl: f64,
    final_bankroll: f64,
    /// Peak-to-trough drop as a fraction of the peak.
    max_drawdown: f64,
    /// Mean model EV of the staked selections.
    avg_ev: f64,
    /// Largest stake as a fraction of the bankroll at the time.
    max_stake_fraction: f64,
}

impl BacktestResult {
    fn roi(&self) -> f64 {
        if self.total_staked > 0.0 {
            self.total_pnl / self.total_staked
        } else {
            0.0
        }
    }
}

fn xg(home: f64, away: f64) -> ProjectedInputs {
    ProjectedInputs {
        home_xg: Some(home),
        away_xg: Some(away),
        ..ProjectedInputs::default()
    }
}

/// Book prices for one market from model probabilities.
///
/// `overround` > 1 gives a normal bookmaker margin; `bias` < 1 on a
/// selection makes it generous and creates an edge.
fn book_price(p: f64, overround: f64, bias: f64) -> f64 {
    let price = 1.0 / (p * overround * bias);
    (price * 100.0).round() / 100.0
}

/// Generate a synthetic slate.
///
/// Every third match offers a generous home price; every fourth
/// offers a generous over. The rest are priced with a 6% margin.
fn generate_synthetic_data(n: usize) -> Vec<HistoricalMatch> {
    let models = EngineConfig::default().models;
    let mut slate = Vec::with_capacity(n);

    for i in 0..n {
        let home_xg = 1.1 + (i % 5) as f64 * 0.2;
        let away_xg = 0.8 + (i % 3) as f64 * 0.25;
        let model = FootballModel::fit(&models.football(home_xg, away_xg));
        let p = model.probs(false);
        let t = model.total_probs(2.5);

        let home_bias = if i % 3 == 0 { 0.90 } else { 1.0 };
        let over_bias = if i % 4 == 0 { 0.90 } else { 1.0 };

        let odds = json!({
            "homeWin": book_price(p.home_win, 1.06, home_bias),
            "draw": book_price(p.draw, 1.06, 1.0),
            "awayWin": book_price(p.away_win, 1.06, 1.0),
            "totalLine": 2.5,
            "totalOver": book_price(t.over, 1.05, over_bias),
            "totalUnder": book_price(t.under, 1.05, 1.0),
        });

        let input = MatchInput::new("football", &format!("Home{i}"), &format!("Away{i}"))
            .with_id(format!("m{i:03}"))
            .with_odds(odds)
            .with_params(xg(home_xg, away_xg));

        // Deterministic scores spanning wins, draws and goal counts.
        let final_score = ((i % 4) as u32, ((i * 7) % 3) as u32);
        slate.push(HistoricalMatch { input, final_score });
    }

    slate
}

/// Settle one recommendation against a final score.
fn settle(rec: &Recommendation, home_team: &str, (home, away): (u32, u32)) -> Settlement {
    let margin = f64::from(home) - f64::from(away);
    let total = f64::from(home) + f64::from(away);
    let outcome = |value: f64| {
        if value > 0.0 {
            Settlement::Won
        } else if value < 0.0 {
            Settlement::Lost
        } else {
            Settlement::Push
        }
    };

    match rec.market {
        Market::MatchResult | Market::Moneyline => {
            let won = match rec.selection.as_str() {
                "Draw" => home == away,
                s if s == home_team => home > away,
                _ => away > home,
            };
            if won { Settlement::Won } else { Settlement::Lost }
        }
        Market::Total => {
            let line = rec.line.unwrap_or(f64::NAN);
            if rec.selection.starts_with("Over") {
                outcome(total - line)
            } else {
                outcome(line - total)
            }
        }
        Market::Spread | Market::AsianHandicap => {
            let line = rec.line.unwrap_or(f64::NAN);
            if rec.selection.starts_with(home_team) {
                outcome(margin + line)
            } else {
                outcome(line - margin)
            }
        }
        Market::Btts => {
            let both = home > 0 && away > 0;
            if both == (rec.selection == "Yes") {
                Settlement::Won
            } else {
                Settlement::Lost
            }
        }
        Market::Corners => unreachable!("the synthetic slate quotes no corners"),
    }
}

/// Run the backtest simulation.
fn run_backtest(slate: &[HistoricalMatch], config: &EngineConfig) -> BacktestResult {
    let evaluator = MatchEvaluator::new(config);

    let mut bankroll = config.engine.bankroll;
    let mut max_bankroll = bankroll;
    let mut max_drawdown = 0.0f64;
    let mut total_bets = 0usize;
    let mut wins = 0usize;
    let mut pushes = 0usize;
    let mut losses = 0usize;
    let mut total_staked = 0.0f64;
    let mut total_pnl = 0.0f64;
    let mut total_ev = 0.0f64;
    let mut max_stake_fraction = 0.0f64;

    for fixture in slate {
        let result = evaluator.evaluate(&fixture.input);
        if !result.is_ok() {
            continue;
        }

        // Stakes are sized off the bankroll going into the match.
        let match_bankroll = bankroll;
        for rec in result.recommended() {
            let stake = rec.stake_pct * match_bankroll;
            if stake <= 0.0 {
                continue;
            }

            total_bets += 1;
            total_staked += stake;
            total_ev += rec.ev;
            max_stake_fraction = max_stake_fraction.max(stake / match_bankroll);

            let pnl = match settle(rec, &result.home_team, fixture.final_score) {
                Settlement::Won => {
                    wins += 1;
                    stake * (rec.odds - 1.0)
                }
                Settlement::Push => {
                    pushes += 1;
                    0.0
                }
                Settlement::Lost => {
                    losses += 1;
                    -stake
                }
            };
            bankroll += pnl;
            total_pnl += pnl;
        }

        if bankroll > max_bankroll {
            max_bankroll = bankroll;
        }
        let drawdown = (max_bankroll - bankroll) / max_bankroll;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    let avg_ev = if total_bets > 0 {
        total_ev / total_bets as f64
    } else {
        0.0
    };

    BacktestResult {
        total_bets,
        wins,
        pushes,
        losses,
        total_staked,
        total_pnl,
        final_bankroll: bankroll,
        max_drawdown,
        avg_ev,
        max_stake_fraction,
    }
}

fn backtest_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.engine.bankroll = 1000.0;
    config
}

#[test]
fn test_backtest_synthetic_data_produces_bets() {
    let slate = generate_synthetic_data(36);
    let result = run_backtest(&slate, &backtest_config());

    assert!(
        result.total_bets > 0,
        "Backtest should stake at least one generous price, got 0"
    );
    assert_eq!(result.wins + result.pushes + result.losses, result.total_bets);
    assert!(result.avg_ev > 0.0);

    println!("=== Backtest Results ===");
    println!("Total bets: {}", result.total_bets);
    println!(
        "Wins: {} | Pushes: {} | Losses: {}",
        result.wins, result.pushes, result.losses
    );
    println!("Staked: ${:.2}", result.total_staked);
    println!("Total PnL: ${:.2} (ROI {:.2}%)", result.total_pnl, result.roi() * 100.0);
    println!("Final bankroll: ${:.2}", result.final_bankroll);
    println!("Max drawdown: {:.2}%", result.max_drawdown * 100.0);
    println!("Avg EV: {:.4}", result.avg_ev);
}

#[test]
fn test_backtest_bankroll_accounting_balances() {
    let config = backtest_config();
    let slate = generate_synthetic_data(36);
    let result = run_backtest(&slate, &config);

    let expected = config.engine.bankroll + result.total_pnl;
    assert!(
        (result.final_bankroll - expected).abs() < 1e-6,
        "bankroll {} != start + pnl {}",
        result.final_bankroll,
        expected
    );
    assert!((0.0..1.0).contains(&result.max_drawdown));
}

#[test]
fn test_backtest_margin_only_book_stakes_nothing() {
    let models = EngineConfig::default().models;
    let slate: Vec<HistoricalMatch> = (0..12)
        .map(|i| {
            let (h, a) = (1.2 + f64::from(i) * 0.1, 1.0);
            let model = FootballModel::fit(&models.football(h, a));
            let p = model.probs(false);
            // Unrounded prices so every selection sits exactly at a 6% margin.
            let odds = json!({
                "homeWin": 1.0 / (p.home_win * 1.06),
                "draw": 1.0 / (p.draw * 1.06),
                "awayWin": 1.0 / (p.away_win * 1.06),
            });
            HistoricalMatch {
                input: MatchInput::new("football", "H", "A")
                    .with_odds(odds)
                    .with_params(xg(h, a)),
                final_score: (1, 0),
            }
        })
        .collect();

    let result = run_backtest(&slate, &backtest_config());
    assert_eq!(result.total_bets, 0, "no selection beats a pure-margin book");
    assert_eq!(result.total_pnl, 0.0);
}

#[test]
fn test_backtest_stakes_respect_kelly_cap() {
    let mut config = backtest_config();
    config.staking.kelly_fraction = 1.0;
    config.staking.kelly_cap = 0.03;

    let slate = generate_synthetic_data(36);
    let result = run_backtest(&slate, &config);

    assert!(result.total_bets > 0);
    assert!(
        result.max_stake_fraction <= 0.03 + 1e-9,
        "stake fraction {} above cap",
        result.max_stake_fraction
    );
}

#[test]
fn test_backtest_whole_line_push_refunds() {
    let rec = Recommendation {
        market: Market::AsianHandicap,
        selection: "H -1".to_string(),
        line: Some(-1.0),
        odds: 2.0,
        probability: 0.4,
        push: 0.2,
        decisive_prob: 0.5,
        implied_prob: 0.5,
        ev: 0.0,
        edge: 0.0,
        fair_odds: 2.5,
        full_kelly: 0.0,
        stake_pct: 0.0,
        stake: rust_decimal::Decimal::ZERO,
        level: Level::Avoid,
    };

    assert_eq!(settle(&rec, "H", (2, 1)), Settlement::Push);
    assert_eq!(settle(&rec, "H", (3, 1)), Settlement::Won);
    assert_eq!(settle(&rec, "H", (1, 1)), Settlement::Lost);

    let away = Recommendation {
        selection: "A +1".to_string(),
        line: Some(1.0),
        ..rec
    };
    assert_eq!(settle(&away, "H", (2, 1)), Settlement::Push);
    assert_eq!(settle(&away, "H", (1, 1)), Settlement::Won);
}
