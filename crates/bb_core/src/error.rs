use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid lineup size: expected {expected}, found {found}")]
    InvalidLineupSize { expected: usize, found: usize },

    #[error("Invalid probabilities for batter '{batter}': {reason}")]
    InvalidProbabilities { batter: String, reason: String },

    #[error("Invalid season stats for batter '{batter}': {reason}")]
    InvalidSeasonStats { batter: String, reason: String },

    #[error("Lineup cannot make outs: every batter has zero strikeout and in-play-out probability")]
    NoOutsPossible,

    #[error("Invalid trial count: {0} (must be >= 1)")]
    InvalidTrialCount(i64),

    #[error("Invalid config value for {field}: {value}")]
    InvalidConfig { field: &'static str, value: f64 },

    #[error("Invalid worker count: {0} (must be between 1 and {})", crate::engine::pool::MAX_WORKERS)]
    InvalidWorkerCount(usize),

    #[error("Invalid environment variable {name}: {value}")]
    InvalidEnvVar { name: &'static str, value: String },

    #[error("Simulation produced no scores")]
    EmptyResult,

    #[error("Score count mismatch: expected {expected}, found {found}")]
    ScoreCountMismatch { expected: usize, found: usize },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Worker {worker} failed: {message}")]
    WorkerFailed { worker: usize, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Whether re-invoking the same run can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SimError::WorkerFailed { .. } => true,
            SimError::WorkerPool(_) => true,
            SimError::Io(_) => true,
            _ => false,
        }
    }

    /// True for failures raised before any game was simulated.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SimError::InvalidLineupSize { .. }
                | SimError::InvalidProbabilities { .. }
                | SimError::InvalidSeasonStats { .. }
                | SimError::NoOutsPossible
                | SimError::InvalidTrialCount(_)
                | SimError::InvalidConfig { .. }
                | SimError::InvalidWorkerCount(_)
                | SimError::InvalidEnvVar { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
