//! Domain layer - odds normalization, sport models and bet sizing.
//!
//! Everything here is pure and synchronous. Bad input degrades to sentinel
//! values (`None`, `NaN`, `0`) instead of errors; the only `Result` is the
//! bet validation gate in [`sanity`].

pub mod combo;
pub mod distributions;
pub mod ev;
pub mod flatten;
pub mod kelly;
pub mod models;
pub mod odds;
pub mod probability;
pub mod sanity;
pub mod sport;
pub mod vig;

// Re-export core types for convenience
pub use combo::{ComboOptions, ComboResult, Leg, analyze_combo};
pub use distributions::{LineSplit, ScoreGrid, Scoreline, SpreadProbs, TotalProbs};
pub use flatten::{FlatOdds, flatten_odds};
pub use kelly::{KellyStaker, StakeSizing};
pub use odds::{OddsFormat, convert_odds_to_decimal_auto};
pub use sanity::{BetValidationError, ValidatedBet, validate_bet, validate_bet_values};
pub use sport::{Sport, normalize_sport};
pub use vig::{VigMethod, VigRemoval, remove_vig};
