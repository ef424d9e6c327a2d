//! Lockstep batch runner: all games advance one step per iteration.
//!
//! Instead of playing each game to the end (vertical), the N games are kept
//! as parallel columns and every iteration pushes all still-active games
//! through one step (horizontal):
//!
//! 1. Inning rollover for games that reached three outs; games that played
//!    their last inning drop out of the active mask.
//! 2. Steal phase, one mask per target base, built only from games with the
//!    right runner/base configuration.
//! 3. One outcome draw per game that still has a live half-inning, bucketed
//!    by outcome.
//! 4. Each outcome bucket is resolved with the shared rule functions.
//!
//! Masks are index lists rather than dense boolean vectors: games that are
//! finished or have nobody on base cost nothing in the steal and resolution
//! passes. Each game owns a [`SplitMix64`] stream, so results are reproducible
//! for a seed regardless of batch composition. Wall-clock cost is bounded by
//! the longest game in the batch; peak memory is linear in N.

use rand::Rng;
use std::time::Instant;
use tracing::debug;

use super::config::SimulationConfig;
use super::fast_prng::SplitMix64;
use super::rules::{self, BaseOutState, StealTarget};
use crate::models::{Lineup, Outcome, LINEUP_SIZE, OUTCOME_COUNT};

/// Per-game state as parallel columns.
struct GameColumns {
    inning: Vec<u8>,
    outs: Vec<u8>,
    batter: Vec<u8>,
    on_first: Vec<bool>,
    on_second: Vec<bool>,
    on_third: Vec<bool>,
    score: Vec<u32>,
    finished: Vec<bool>,
    rng: Vec<SplitMix64>,
}

impl GameColumns {
    fn new(num_games: usize, seed: u64) -> Self {
        Self {
            inning: vec![0; num_games],
            outs: vec![0; num_games],
            batter: vec![0; num_games],
            on_first: vec![false; num_games],
            on_second: vec![false; num_games],
            on_third: vec![false; num_games],
            score: vec![0; num_games],
            finished: vec![false; num_games],
            rng: (0..num_games)
                .map(|i| SplitMix64::for_stream(seed, i as u64))
                .collect(),
        }
    }

    #[inline(always)]
    fn load(&self, i: usize) -> BaseOutState {
        BaseOutState {
            outs: self.outs[i],
            first: self.on_first[i],
            second: self.on_second[i],
            third: self.on_third[i],
        }
    }

    #[inline(always)]
    fn store(&mut self, i: usize, s: BaseOutState) {
        self.outs[i] = s.outs;
        self.on_first[i] = s.first;
        self.on_second[i] = s.second;
        self.on_third[i] = s.third;
    }
}

pub struct BatchRunner<'a> {
    lineup: &'a Lineup,
    config: &'a SimulationConfig,
}

impl<'a> BatchRunner<'a> {
    pub fn new(lineup: &'a Lineup, config: &'a SimulationConfig) -> Self {
        Self { lineup, config }
    }

    /// Play `num_games` games in lockstep and return their final scores.
    pub fn run(&self, num_games: usize, seed: u64) -> Vec<u32> {
        let start = Instant::now();
        let config = self.config;
        let mut games = GameColumns::new(num_games, seed);

        let mut active: Vec<usize> = (0..num_games).collect();
        let mut mask: Vec<usize> = Vec::with_capacity(num_games);
        let mut buckets: [Vec<usize>; OUTCOME_COUNT] = Default::default();
        let mut steps = 0usize;

        loop {
            // Rollover
            for &i in &active {
                if games.outs[i] >= rules::OUTS_PER_INNING {
                    let (inning, finished) =
                        rules::next_inning(games.inning[i], config.innings_per_game);
                    games.inning[i] = inning;
                    games.finished[i] = finished;
                    games.store(i, BaseOutState::default());
                }
            }
            active.retain(|&i| !games.finished[i]);
            if active.is_empty() {
                break;
            }

            // Steals
            for target in StealTarget::ORDER {
                mask.clear();
                mask.extend(active.iter().copied().filter(|&i| target.eligible(&games.load(i))));
                for &i in &mask {
                    let mut s = games.load(i);
                    let attempt = rules::attempt_steal(&mut s, target, config, &mut games.rng[i]);
                    games.store(i, s);
                    games.score[i] += attempt.runs();
                }
            }

            // Outcome draw
            for bucket in buckets.iter_mut() {
                bucket.clear();
            }
            for &i in &active {
                if games.outs[i] >= rules::OUTS_PER_INNING {
                    continue;
                }
                let u = games.rng[i].gen::<f64>();
                let outcome = self.lineup.outcome_for(games.batter[i] as usize, u);
                buckets[outcome.index()].push(i);
                games.batter[i] = (games.batter[i] + 1) % LINEUP_SIZE as u8;
            }

            // Resolution
            for (k, bucket) in buckets.iter().enumerate() {
                let outcome = Outcome::ALL[k];
                for &i in bucket {
                    let mut s = games.load(i);
                    let runs = rules::resolve_outcome(&mut s, outcome, config, &mut games.rng[i]);
                    games.store(i, s);
                    games.score[i] += runs;
                }
            }

            steps += 1;
        }

        debug!(
            num_games,
            steps,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "batch run complete"
        );
        games.score
    }
}
