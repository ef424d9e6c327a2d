//! JSON request/response surface.
//!
//! `simulate_json` takes a [`SimulationRequest`] document and returns the
//! serialized [`SimulationResult`]. Errors come back as human-readable strings
//! so hosts without access to [`SimError`] can surface them directly.

use serde::{Deserialize, Serialize};

use crate::engine::{SimulationConfig, SimulationStrategy};
use crate::error::{Result, SimError};
use crate::models::{BatterProfile, SeasonStats, OUTCOME_COUNT};

/// Request schema understood by [`simulate_json`].
pub const SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub schema_version: u8,
    /// Random seed; drawn fresh when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Signed so that zero and negative counts reach validation instead of
    /// failing as a type mismatch.
    pub num_games: i64,
    #[serde(default)]
    pub strategy: SimulationStrategy,
    #[serde(default)]
    pub workers: Option<usize>,
    /// Partial configs are filled from the defaults.
    #[serde(default)]
    pub config: Option<SimulationConfig>,
    pub lineup: Vec<LineupEntry>,
    /// Keep the per-game score list in the response.
    #[serde(default = "default_include_scores")]
    pub include_scores: bool,
}

fn default_include_scores() -> bool {
    true
}

/// One lineup slot: either explicit outcome probabilities or season stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineupEntry {
    Probabilities { name: String, probabilities: [f64; OUTCOME_COUNT] },
    Stats { name: String, stats: SeasonStats },
}

impl LineupEntry {
    pub fn name(&self) -> &str {
        match self {
            LineupEntry::Probabilities { name, .. } | LineupEntry::Stats { name, .. } => name,
        }
    }

    pub fn into_profile(self) -> Result<BatterProfile> {
        match self {
            LineupEntry::Probabilities { name, probabilities } => {
                BatterProfile::new(name, probabilities)
            }
            LineupEntry::Stats { name, stats } => BatterProfile::from_season_stats(name, &stats),
        }
    }
}

impl From<&BatterProfile> for LineupEntry {
    fn from(profile: &BatterProfile) -> Self {
        LineupEntry::Probabilities {
            name: profile.name().to_string(),
            probabilities: *profile.probabilities(),
        }
    }
}

/// Run a simulation described by a JSON request.
pub fn simulate_json(request_json: &str) -> std::result::Result<String, String> {
    let request: SimulationRequest =
        serde_json::from_str(request_json).map_err(|e| format!("Invalid JSON request: {}", e))?;

    if request.schema_version != SCHEMA_VERSION {
        return Err(format!("Unsupported schema version: {}", request.schema_version));
    }

    let num_games = usize::try_from(request.num_games)
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| SimError::InvalidTrialCount(request.num_games).to_string())?;

    let lineup = request
        .lineup
        .into_iter()
        .map(LineupEntry::into_profile)
        .collect::<Result<Vec<_>>>()
        .map_err(|e| format!("Lineup validation failed: {}", e))?;

    let config = request.config.unwrap_or_default();
    let seed = request.seed.unwrap_or_else(rand::random);

    let result = super::simulate_with(
        &lineup,
        &config,
        num_games,
        request.strategy,
        seed,
        request.workers,
    )
    .map_err(|e| e.to_string())?;

    let result = if request.include_scores { result } else { result.without_scores() };
    serde_json::to_string(&result).map_err(|e| format!("Failed to serialize result: {}", e))
}
