//! Simulation run output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::engine::SimulationStrategy;
use crate::error::{Result, SimError};
use crate::stats::ScoreSummary;

/// Aggregate result of one simulation run.
///
/// `all_scores` holds one entry per game in execution order; its length is
/// always `num_games`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub lineup_names: Vec<String>,
    pub num_games: usize,
    pub strategy: SimulationStrategy,
    pub seed: u64,
    pub avg_score: f64,
    pub median_score: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min_score: u32,
    pub max_score: u32,
    /// Runs scored → number of games.
    pub distribution: BTreeMap<u32, u64>,
    #[serde(default)]
    pub all_scores: Vec<u32>,
    #[serde(default)]
    pub elapsed_ms: f64,
}

impl SimulationResult {
    /// Assemble a result from raw scores; fails if the count is off.
    pub fn from_scores(
        lineup_names: Vec<String>,
        num_games: usize,
        strategy: SimulationStrategy,
        seed: u64,
        scores: Vec<u32>,
    ) -> Result<Self> {
        if scores.len() != num_games {
            return Err(SimError::ScoreCountMismatch { expected: num_games, found: scores.len() });
        }
        let summary = ScoreSummary::from_scores(&scores)?;
        Ok(Self {
            lineup_names,
            num_games,
            strategy,
            seed,
            avg_score: summary.mean,
            median_score: summary.median,
            std_dev: summary.std_dev,
            min_score: summary.min,
            max_score: summary.max,
            distribution: summary.distribution,
            all_scores: scores,
            elapsed_ms: 0.0,
        })
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: f64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    /// Recompute the full summary from `all_scores`.
    pub fn summary(&self) -> Result<ScoreSummary> {
        ScoreSummary::from_scores(&self.all_scores)
    }

    pub fn standard_error(&self) -> f64 {
        self.std_dev / (self.num_games as f64).sqrt()
    }

    /// Drop the per-game scores, keeping the aggregates.
    pub fn without_scores(mut self) -> Self {
        self.all_scores = Vec::new();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        (1..=9).map(|i| format!("B{i}")).collect()
    }

    #[test]
    fn test_from_scores_fills_aggregates() {
        let r = SimulationResult::from_scores(
            names(),
            4,
            SimulationStrategy::Scalar,
            1,
            vec![0, 2, 4, 6],
        )
        .unwrap();
        assert_eq!(r.avg_score, 3.0);
        assert_eq!(r.median_score, 3.0);
        assert!((r.std_dev - 5.0f64.sqrt()).abs() < 1e-12);
        assert_eq!((r.min_score, r.max_score), (0, 6));
        assert_eq!(r.distribution.values().sum::<u64>(), 4);
        assert_eq!(r.all_scores.len(), r.num_games);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let err = SimulationResult::from_scores(
            names(),
            5,
            SimulationStrategy::Parallel,
            1,
            vec![1, 2, 3],
        )
        .unwrap_err();
        assert!(matches!(err, SimError::ScoreCountMismatch { expected: 5, found: 3 }));
    }

    #[test]
    fn test_serializes_strategy_lowercase() {
        let r = SimulationResult::from_scores(
            names(),
            1,
            SimulationStrategy::Vectorized,
            9,
            vec![3],
        )
        .unwrap()
        .without_scores();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["strategy"], "vectorized");
        assert_eq!(json["all_scores"].as_array().unwrap().len(), 0);
    }
}
