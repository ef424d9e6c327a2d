//! # bb_core - Monte Carlo lineup run simulator
//!
//! Estimates how many runs a fixed nine-batter lineup produces per game. Each
//! batter is a probability distribution over seven plate-appearance outcomes;
//! games are played with a simplified baserunning model and aggregated over
//! many trials.
//!
//! ## Features
//! - One canonical rule set shared by every execution strategy
//! - Scalar, worker-pool and lockstep batch runners
//! - Deterministic per seed (same seed = same scores)
//! - JSON API for hosting processes

pub mod api;
pub mod engine;
pub mod error;
pub mod models;
pub mod stats;

pub use api::{
    cross_check, sample_game, simulate, simulate_json, simulate_with, CrossCheck, SimulationRequest,
};
pub use engine::{SimulationConfig, SimulationStrategy};
pub use error::{Result, SimError};
pub use models::{BatterProfile, Lineup, Outcome, SeasonStats, SimulationResult};
pub use stats::ScoreSummary;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
