pub mod batch;
pub mod config; // Rule probabilities + presets
pub mod fast_prng;
pub mod game;
pub mod pool;
pub mod rules; // Canonical transition functions shared by every runner
pub mod scalar;
pub mod strategy;


pub use batch::BatchRunner;
pub use config::{SimulationConfig, CONFIG_PATH_ENV};
pub use fast_prng::SplitMix64;
pub use game::{
    simulate_game_with_log, GameLog, GameState, GameStateMachine, GameTally, StepReport,
};
pub use pool::{ParallelWorkPool, MAX_WORKERS, RAYON_THREADS_ENV, WORKERS_ENV};
pub use rules::{BaseOutState, StealAttempt, StealTarget, OUTS_PER_INNING};
pub use scalar::ScalarRunner;
pub use strategy::SimulationStrategy;
