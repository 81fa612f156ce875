//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the domain layer into the engine's workflows.
//!
//! Use cases:
//! - `MatchEvaluator`: flatten odds, fit the sport model, price and size
//!   every quoted selection
//! - `validate_engine_result`: sanity gate over an evaluated board

pub mod match_evaluator;
pub mod result_validator;

pub use match_evaluator::{
  EngineResult, Level, Market, MatchEvaluator, MatchInput, ProjectedInputs, Recommendation,
};
pub use result_validator::{ValidationReport, validate_engine_result};
