//! Per-sport probability models.
//!
//! Each model is fitted once from projected scoring inputs into an immutable
//! value; line-dependent markets are query methods on that value. Invalid
//! inputs degrade to documented defaults or to NaN outputs, never panics.

pub mod baseball;
pub mod basketball;
pub mod corners;
pub mod fallback;
pub mod football;
pub mod hockey;
pub mod nfl;
pub mod tennis;
pub mod weather;

pub use baseball::{
    BaseballInputs, BaseballModel, BaseballProbs, PitchingInputs, RunEnvironment, RunTotals,
    calc_baseball_probs,
};
pub use basketball::{
    BasketballInputs, BasketballModel, BasketballProbs, PaceRatings, calc_basketball_probs,
};
pub use corners::{CornersInputs, CornersModel};
pub use fallback::{FallbackInputs, FallbackProbs, calc_generic_probs};
pub use football::{
    DixonColesMode, EloInputs, FootballInputs, FootballModel, FootballProbs, calc_football_probs,
    elo_weight,
};
pub use hockey::{HockeyInputs, HockeyModel, HockeyProbs, OtMode, OtModel, calc_hockey_probs};
pub use nfl::{EpaInputs, NflInputs, NflModel, NflProbs, NflProjection, calc_nfl_probs};
pub use tennis::{TennisInputs, TennisProbs, calc_tennis_probs};
pub use weather::{WeatherReport, adjust_for_weather};
