//! Fixed-chunk parallel execution.
//!
//! The requested game count is split into one chunk per worker (remainder to
//! the first workers). Each worker runs its own [`ScalarRunner`] on its own
//! ChaCha stream and hands back a score list; chunks are concatenated in
//! worker order. Workers share nothing mutable. A panicking worker fails the
//! whole run.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::any::Any;
use std::env::VarError;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

use super::config::SimulationConfig;
use super::scalar::ScalarRunner;
use crate::error::{Result, SimError};
use crate::models::Lineup;

/// Worker count override read by [`ParallelWorkPool::from_env`].
pub const WORKERS_ENV: &str = "BB_SIM_WORKERS";

/// Rayon's own thread-count variable, consulted after [`WORKERS_ENV`].
pub const RAYON_THREADS_ENV: &str = "RAYON_NUM_THREADS";

/// Upper bound on the worker count accepted by [`ParallelWorkPool::new`].
pub const MAX_WORKERS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelWorkPool {
    workers: usize,
}

impl ParallelWorkPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 || workers > MAX_WORKERS {
            return Err(SimError::InvalidWorkerCount(workers));
        }
        Ok(Self { workers })
    }

    /// `BB_SIM_WORKERS`, then `RAYON_NUM_THREADS`, then rayon's default.
    ///
    /// A set but unusable `BB_SIM_WORKERS` is an error. An unusable
    /// `RAYON_NUM_THREADS` is skipped with a warning, as rayon itself does.
    pub fn from_env() -> Result<Self> {
        let workers = read_env(WORKERS_ENV)?;
        let rayon_threads = read_env(RAYON_THREADS_ENV).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring {RAYON_THREADS_ENV}");
            None
        });
        Self::from_vars(workers.as_deref(), rayon_threads.as_deref())
    }

    fn from_vars(workers: Option<&str>, rayon_threads: Option<&str>) -> Result<Self> {
        if let Some(value) = workers.map(str::trim).filter(|v| !v.is_empty()) {
            let n = value.parse::<usize>().map_err(|_| SimError::InvalidEnvVar {
                name: WORKERS_ENV,
                value: value.to_string(),
            })?;
            return Self::new(n);
        }

        if let Some(value) = rayon_threads.map(str::trim).filter(|v| !v.is_empty()) {
            match value.parse::<usize>().ok().and_then(|n| Self::new(n).ok()) {
                Some(pool) => return Ok(pool),
                None => warn!(value, "ignoring unusable {RAYON_THREADS_ENV}"),
            }
        }

        Ok(Self { workers: rayon::current_num_threads().clamp(1, MAX_WORKERS) })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Games per worker: as even as possible, remainder to the first workers.
    pub fn partition(&self, total: usize) -> Vec<usize> {
        let base = total / self.workers;
        let extra = total % self.workers;
        (0..self.workers).map(|w| base + usize::from(w < extra)).collect()
    }

    /// Run `num_games` scalar games across the pool.
    pub fn run(
        &self,
        lineup: &Lineup,
        config: &SimulationConfig,
        num_games: usize,
        seed: u64,
    ) -> Result<Vec<u32>> {
        self.run_with(num_games, |worker, games| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(worker as u64);
            ScalarRunner::new(lineup, config).run(games, &mut rng)
        })
    }

    /// Run `job(worker, games)` for every chunk and concatenate the results.
    pub fn run_with<F>(&self, num_games: usize, job: F) -> Result<Vec<u32>>
    where
        F: Fn(usize, usize) -> Vec<u32> + Sync,
    {
        if self.workers > num_games {
            warn!(
                workers = self.workers,
                num_games, "more workers than games; some workers will idle"
            );
        }

        // Chunks beyond the game count are empty; no thread is spawned for them.
        let threads = self.workers.min(num_games).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("bb-sim-worker-{i}"))
            .build()
            .map_err(|e| SimError::WorkerPool(e.to_string()))?;

        let chunks = self.partition(num_games);
        let outputs: Vec<std::thread::Result<Vec<u32>>> = pool.install(|| {
            chunks
                .par_iter()
                .enumerate()
                .map(|(worker, &games)| {
                    panic::catch_unwind(AssertUnwindSafe(|| {
                        debug!(worker, games, "worker started");
                        job(worker, games)
                    }))
                })
                .collect()
        });

        let mut scores = Vec::with_capacity(num_games);
        for (worker, output) in outputs.into_iter().enumerate() {
            match output {
                Ok(chunk) => scores.extend(chunk),
                Err(payload) => {
                    return Err(SimError::WorkerFailed {
                        worker,
                        message: panic_message(payload.as_ref()),
                    })
                }
            }
        }
        Ok(scores)
    }
}

fn read_env(name: &'static str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(SimError::InvalidEnvVar {
            name,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatterProfile;

    fn lineup() -> Lineup {
        Lineup::uniform(
            &BatterProfile::new("Avg", [0.15, 0.50, 0.15, 0.15, 0.045, 0.005, 0.0]).unwrap(),
        )
    }

    #[test]
    fn test_partition_remainder_to_first_workers() {
        let pool = ParallelWorkPool::new(4).unwrap();
        assert_eq!(pool.partition(10), vec![3, 3, 2, 2]);
        assert_eq!(pool.partition(8), vec![2, 2, 2, 2]);
        assert_eq!(pool.partition(2), vec![1, 1, 0, 0]);
        assert_eq!(pool.partition(10).iter().sum::<usize>(), 10);
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(ParallelWorkPool::new(0), Err(SimError::InvalidWorkerCount(0))));
    }

    #[test]
    fn test_worker_count_capped() {
        assert!(ParallelWorkPool::new(MAX_WORKERS).is_ok());
        assert!(matches!(
            ParallelWorkPool::new(1_000_000),
            Err(SimError::InvalidWorkerCount(1_000_000))
        ));
    }

    #[test]
    fn test_env_workers_take_precedence() {
        let pool = ParallelWorkPool::from_vars(Some("6"), Some("3")).unwrap();
        assert_eq!(pool.workers(), 6);
    }

    #[test]
    fn test_env_falls_back_to_rayon_threads() {
        let pool = ParallelWorkPool::from_vars(None, Some("3")).unwrap();
        assert_eq!(pool.workers(), 3);
        let pool = ParallelWorkPool::from_vars(Some("  "), Some("3")).unwrap();
        assert_eq!(pool.workers(), 3);
    }

    #[test]
    fn test_unusable_env_workers_is_an_error() {
        match ParallelWorkPool::from_vars(Some("abc"), Some("3")) {
            Err(SimError::InvalidEnvVar { name, value }) => {
                assert_eq!(name, WORKERS_ENV);
                assert_eq!(value, "abc");
            }
            other => panic!("expected InvalidEnvVar, got {other:?}"),
        }
        assert!(matches!(
            ParallelWorkPool::from_vars(Some("0"), Some("3")),
            Err(SimError::InvalidWorkerCount(0))
        ));
    }

    #[test]
    fn test_unusable_rayon_threads_uses_rayon_default() {
        let pool = ParallelWorkPool::from_vars(None, Some("lots")).unwrap();
        assert!(pool.workers() >= 1);
        let pool = ParallelWorkPool::from_vars(None, None).unwrap();
        assert_eq!(pool.workers(), rayon::current_num_threads().clamp(1, MAX_WORKERS));
    }

    #[test]
    fn test_pool_returns_all_scores() {
        let lineup = lineup();
        let config = SimulationConfig::default();
        let pool = ParallelWorkPool::new(3).unwrap();
        let scores = pool.run(&lineup, &config, 1_001, 7).unwrap();
        assert_eq!(scores.len(), 1_001);
    }

    #[test]
    fn test_pool_is_reproducible() {
        let lineup = lineup();
        let config = SimulationConfig::default();
        let pool = ParallelWorkPool::new(4).unwrap();
        let a = pool.run(&lineup, &config, 500, 99).unwrap();
        let b = pool.run(&lineup, &config, 500, 99).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_workers_use_independent_streams() {
        let lineup = lineup();
        let config = SimulationConfig::default();
        let pool = ParallelWorkPool::new(2).unwrap();
        let scores = pool.run(&lineup, &config, 400, 5).unwrap();
        assert_ne!(scores[..200], scores[200..]);
    }

    #[test]
    fn test_worker_panic_fails_whole_run() {
        let pool = ParallelWorkPool::new(3).unwrap();
        let result = pool.run_with(30, |worker, games| {
            if worker == 1 {
                panic!("injected failure");
            }
            vec![0; games]
        });
        match result {
            Err(SimError::WorkerFailed { worker, message }) => {
                assert_eq!(worker, 1);
                assert!(message.contains("injected failure"));
            }
            other => panic!("expected worker failure, got {other:?}"),
        }
    }

    #[test]
    fn test_more_workers_than_games() {
        let lineup = lineup();
        let config = SimulationConfig::default();
        let pool = ParallelWorkPool::new(8).unwrap();
        assert_eq!(pool.run(&lineup, &config, 3, 1).unwrap().len(), 3);
    }

    #[test]
    fn test_threads_capped_at_game_count() {
        let pool = ParallelWorkPool::new(MAX_WORKERS).unwrap();
        let scores = pool
            .run_with(2, |_, games| {
                assert!(rayon::current_num_threads() <= 2);
                vec![1; games]
            })
            .unwrap();
        assert_eq!(scores, vec![1, 1]);
    }
}
