use serde::Serialize;

use super::batter::{BatterProfile, Outcome};
use crate::error::{Result, SimError};

/// Batters in a lineup; the order wraps across innings.
pub const LINEUP_SIZE: usize = 9;

/// Nine batter profiles in fixed batting order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lineup {
    batters: [BatterProfile; LINEUP_SIZE],
}

impl Lineup {
    pub fn new(batters: Vec<BatterProfile>) -> Result<Self> {
        let found = batters.len();
        let batters: [BatterProfile; LINEUP_SIZE] = batters
            .try_into()
            .map_err(|_| SimError::InvalidLineupSize { expected: LINEUP_SIZE, found })?;
        Ok(Self { batters })
    }

    pub fn from_slice(batters: &[BatterProfile]) -> Result<Self> {
        Self::new(batters.to_vec())
    }

    /// Nine copies of the same profile.
    pub fn uniform(profile: &BatterProfile) -> Self {
        Self { batters: std::array::from_fn(|_| profile.clone()) }
    }

    pub fn batter(&self, slot: usize) -> &BatterProfile {
        &self.batters[slot % LINEUP_SIZE]
    }

    pub fn batters(&self) -> &[BatterProfile; LINEUP_SIZE] {
        &self.batters
    }

    pub fn names(&self) -> Vec<String> {
        self.batters.iter().map(|b| b.name().to_string()).collect()
    }

    /// Draw the outcome for the batter in `slot` from a uniform sample.
    #[inline]
    pub fn outcome_for(&self, slot: usize, u: f64) -> Outcome {
        self.batter(slot).outcome_for(u)
    }

    /// Mean on-base probability across the nine slots.
    pub fn mean_on_base_probability(&self) -> f64 {
        self.batters.iter().map(|b| b.on_base_probability()).sum::<f64>() / LINEUP_SIZE as f64
    }
}
