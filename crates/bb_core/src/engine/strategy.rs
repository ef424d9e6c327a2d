use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Execution strategy for a simulation run.
///
/// All three produce statistically equivalent score distributions for the
/// same lineup and configuration; only throughput differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationStrategy {
    /// One game after another on the calling thread.
    Scalar,
    /// Fixed chunks across a worker pool.
    #[default]
    Parallel,
    /// All games in lockstep over struct-of-arrays state.
    Vectorized,
}

impl SimulationStrategy {
    pub const ALL: [SimulationStrategy; 3] = [
        SimulationStrategy::Scalar,
        SimulationStrategy::Parallel,
        SimulationStrategy::Vectorized,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SimulationStrategy::Scalar => "scalar",
            SimulationStrategy::Parallel => "parallel",
            SimulationStrategy::Vectorized => "vectorized",
        }
    }
}

impl fmt::Display for SimulationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" | "sequential" => Ok(SimulationStrategy::Scalar),
            "parallel" => Ok(SimulationStrategy::Parallel),
            "vectorized" | "batch" | "lockstep" => Ok(SimulationStrategy::Vectorized),
            other => Err(format!(
                "unknown strategy '{other}' (expected scalar, parallel or vectorized)"
            )),
        }
    }
}
