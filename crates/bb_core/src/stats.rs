//! Score aggregation.
//!
//! Reduces the final scores of a run into mean, median, population standard
//! deviation and a score → frequency table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: u32,
    pub max: u32,
    /// Runs scored → number of games.
    pub distribution: BTreeMap<u32, u64>,
}

impl ScoreSummary {
    /// Summarize a non-empty score list.
    pub fn from_scores(scores: &[u32]) -> Result<Self> {
        if scores.is_empty() {
            return Err(SimError::EmptyResult);
        }

        let n = scores.len();
        let sum: f64 = scores.iter().map(|&s| s as f64).sum();
        let mean = sum / n as f64;
        let variance = scores
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64;

        let mut distribution: BTreeMap<u32, u64> = BTreeMap::new();
        for &s in scores {
            *distribution.entry(s).or_insert(0) += 1;
        }

        // Keys are sorted, so min/max/median come straight off the histogram.
        let min = distribution.keys().next().copied().unwrap_or(0);
        let max = distribution.keys().next_back().copied().unwrap_or(0);
        let median = if n % 2 == 1 {
            rank_value(&distribution, n / 2) as f64
        } else {
            (rank_value(&distribution, n / 2 - 1) as f64 + rank_value(&distribution, n / 2) as f64)
                / 2.0
        };

        Ok(Self { count: n, mean, median, std_dev: variance.sqrt(), min, max, distribution })
    }

    /// Score at the given percentile (0-100, nearest rank).
    pub fn percentile(&self, p: f64) -> u32 {
        let p = p.clamp(0.0, 100.0);
        let rank = ((p / 100.0) * self.count as f64).ceil() as usize;
        rank_value(&self.distribution, rank.saturating_sub(1).min(self.count - 1))
    }

    /// Standard error of the mean.
    pub fn standard_error(&self) -> f64 {
        self.std_dev / (self.count as f64).sqrt()
    }

    /// std_dev / mean of the per-game score distribution.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }

    /// Standard error relative to the mean; shrinks as trials grow.
    pub fn relative_standard_error(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.standard_error() / self.mean
        }
    }

    /// Fraction of games with exactly `runs` scored.
    pub fn frequency(&self, runs: u32) -> f64 {
        self.distribution.get(&runs).copied().unwrap_or(0) as f64 / self.count as f64
    }

    /// Fraction of games with no runs.
    pub fn shutout_rate(&self) -> f64 {
        self.frequency(0)
    }
}

/// Value at 0-based `rank` in the sorted sample described by `distribution`.
fn rank_value(distribution: &BTreeMap<u32, u64>, rank: usize) -> u32 {
    let mut seen = 0u64;
    for (&score, &count) in distribution {
        seen += count;
        if seen > rank as u64 {
            return score;
        }
    }
    distribution.keys().next_back().copied().unwrap_or(0)
}
