//! Public entry points.
//!
//! Every entry point validates its inputs before a single game is played:
//! lineup size, probability vectors (already enforced by
//! [`BatterProfile::new`]), config ranges, trial count, and that the lineup
//! can make outs at all.

pub mod json_api;
pub mod lineup_file;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::engine::{
    simulate_game_with_log, BatchRunner, GameLog, ParallelWorkPool, ScalarRunner,
    SimulationConfig, SimulationStrategy,
};
use crate::error::{Result, SimError};
use crate::models::{BatterProfile, Lineup, Outcome, SimulationResult};
use crate::stats::ScoreSummary;

pub use json_api::{simulate_json, LineupEntry, SimulationRequest, SCHEMA_VERSION};
pub use lineup_file::{convert_entries, load_lineup_file, parse_lineup};

/// Simulate `num_games` games with a fresh random seed.
pub fn simulate(
    lineup: &[BatterProfile],
    config: &SimulationConfig,
    num_games: usize,
    strategy: SimulationStrategy,
) -> Result<SimulationResult> {
    simulate_with(lineup, config, num_games, strategy, rand::random(), None)
}

/// Simulate with an explicit seed and (for the parallel strategy) worker count.
///
/// The same `(lineup, config, num_games, strategy, seed, workers)` always
/// yields the same scores.
pub fn simulate_with(
    lineup: &[BatterProfile],
    config: &SimulationConfig,
    num_games: usize,
    strategy: SimulationStrategy,
    seed: u64,
    workers: Option<usize>,
) -> Result<SimulationResult> {
    let lineup = Lineup::from_slice(lineup)?;
    config.validate()?;
    if num_games == 0 {
        return Err(SimError::InvalidTrialCount(0));
    }
    ensure_outs_possible(&lineup)?;
    let pool = match (strategy, workers) {
        (SimulationStrategy::Parallel, Some(w)) => Some(ParallelWorkPool::new(w)?),
        (SimulationStrategy::Parallel, None) => Some(ParallelWorkPool::from_env()?),
        _ => None,
    };

    info!(%strategy, num_games, seed, "simulation started");
    let start = Instant::now();

    let scores = match pool {
        Some(pool) => pool.run(&lineup, config, num_games, seed)?,
        None if strategy == SimulationStrategy::Vectorized => {
            BatchRunner::new(&lineup, config).run(num_games, seed)
        }
        None => ScalarRunner::new(&lineup, config).run_seeded(num_games, seed),
    };

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    let result = SimulationResult::from_scores(lineup.names(), num_games, strategy, seed, scores)?
        .with_elapsed_ms(elapsed_ms);

    info!(
        %strategy,
        num_games,
        avg_score = result.avg_score,
        std_dev = result.std_dev,
        elapsed_ms,
        "simulation finished"
    );
    Ok(result)
}

/// Scalar (parallel pool) and vectorized summaries for the same inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossCheck {
    pub scalar: ScoreSummary,
    pub vectorized: ScoreSummary,
    /// `|scalar.mean - vectorized.mean| / scalar.mean`; 0 when both are 0.
    pub relative_difference: f64,
}

impl CrossCheck {
    pub fn agrees_within(&self, tolerance: f64) -> bool {
        self.relative_difference <= tolerance
    }
}

/// Run the pooled scalar path and the vectorized path side by side.
pub fn cross_check(
    lineup: &[BatterProfile],
    config: &SimulationConfig,
    num_games: usize,
    seed: u64,
) -> Result<CrossCheck> {
    let scalar =
        simulate_with(lineup, config, num_games, SimulationStrategy::Parallel, seed, None)?;
    let vectorized =
        simulate_with(lineup, config, num_games, SimulationStrategy::Vectorized, seed, None)?;

    let scalar = scalar.summary()?;
    let vectorized = vectorized.summary()?;
    let relative_difference = if scalar.mean == 0.0 && vectorized.mean == 0.0 {
        0.0
    } else if scalar.mean == 0.0 {
        f64::INFINITY
    } else {
        (scalar.mean - vectorized.mean).abs() / scalar.mean
    };

    info!(
        scalar_mean = scalar.mean,
        vectorized_mean = vectorized.mean,
        relative_difference,
        "cross-check complete"
    );
    Ok(CrossCheck { scalar, vectorized, relative_difference })
}

/// Play one seeded game and keep its step log.
pub fn sample_game(
    lineup: &[BatterProfile],
    config: &SimulationConfig,
    seed: u64,
) -> Result<GameLog> {
    let lineup = Lineup::from_slice(lineup)?;
    config.validate()?;
    ensure_outs_possible(&lineup)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok(simulate_game_with_log(&lineup, config, &mut rng))
}

/// A lineup where no batter can strike out or make an in-play out would
/// never finish its first inning.
fn ensure_outs_possible(lineup: &Lineup) -> Result<()> {
    let can_make_out = lineup.batters().iter().any(|b| {
        b.probability(Outcome::Strikeout) > 0.0 || b.probability(Outcome::InPlayOut) > 0.0
    });
    if can_make_out {
        Ok(())
    } else {
        Err(SimError::NoOutsPossible)
    }
}
