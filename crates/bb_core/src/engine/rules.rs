//! Canonical base-running rules.
//!
//! Every transition of the bases/outs state lives here as a pure function of
//! `(state, config, rng)`. The scalar state machine calls them on one game;
//! the batch runner calls the same functions on the games selected by a mask.
//! No other module is allowed to move runners.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use crate::models::Outcome;

/// Outs that end a half-inning.
pub const OUTS_PER_INNING: u8 = 3;

/// Outs and base occupancy for the half-inning in progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseOutState {
    pub outs: u8,
    pub first: bool,
    pub second: bool,
    pub third: bool,
}

impl BaseOutState {
    pub fn occupied(&self) -> u32 {
        self.first as u32 + self.second as u32 + self.third as u32
    }

    pub fn is_empty(&self) -> bool {
        !(self.first || self.second || self.third)
    }

    pub fn inning_over(&self) -> bool {
        self.outs >= OUTS_PER_INNING
    }

    fn record_out(&mut self) {
        self.outs = (self.outs + 1).min(OUTS_PER_INNING);
    }

    fn clear(&mut self) -> u32 {
        let runners = self.occupied();
        self.first = false;
        self.second = false;
        self.third = false;
        runners
    }
}

/// Base a runner tries to steal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StealTarget {
    Second,
    Third,
    Home,
}

impl StealTarget {
    /// Attempt order within one step.
    pub const ORDER: [StealTarget; 3] = [StealTarget::Second, StealTarget::Third, StealTarget::Home];

    /// A runner is on the base behind the target and the target is open.
    #[inline]
    pub fn eligible(self, state: &BaseOutState) -> bool {
        if state.inning_over() {
            return false;
        }
        match self {
            StealTarget::Second => state.first && !state.second,
            StealTarget::Third => state.second && !state.third,
            StealTarget::Home => state.third,
        }
    }

    pub fn success_probability(self, config: &SimulationConfig) -> f64 {
        match self {
            StealTarget::Second => config.prob_steal_2nd,
            StealTarget::Third => config.prob_steal_3rd,
            StealTarget::Home => config.prob_steal_home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealAttempt {
    pub target: StealTarget,
    pub success: bool,
}

impl StealAttempt {
    /// Runs scored by the attempt (only a stolen home counts).
    pub fn runs(&self) -> u32 {
        (self.success && self.target == StealTarget::Home) as u32
    }
}

/// Resolve one steal attempt. Callers must check [`StealTarget::eligible`].
#[inline]
pub fn attempt_steal<R: Rng + ?Sized>(
    state: &mut BaseOutState,
    target: StealTarget,
    config: &SimulationConfig,
    rng: &mut R,
) -> StealAttempt {
    let success = rng.gen::<f64>() < target.success_probability(config);
    match target {
        StealTarget::Second => {
            state.first = false;
            state.second = success;
        }
        StealTarget::Third => {
            state.second = false;
            state.third = success;
        }
        StealTarget::Home => {
            state.third = false;
        }
    }
    if !success {
        state.record_out();
    }
    StealAttempt { target, success }
}

/// Resolve the plate appearance `outcome`; returns runs scored.
#[inline]
pub fn resolve_outcome<R: Rng + ?Sized>(
    state: &mut BaseOutState,
    outcome: Outcome,
    config: &SimulationConfig,
    rng: &mut R,
) -> u32 {
    match outcome {
        Outcome::Strikeout => strikeout(state),
        Outcome::InPlayOut => in_play_out(state, config, rng),
        Outcome::Walk => walk(state),
        Outcome::Single => single(state, config, rng),
        Outcome::Double => double(state, config, rng),
        Outcome::Triple => triple(state),
        Outcome::HomeRun => home_run(state),
    }
}

pub fn strikeout(state: &mut BaseOutState) -> u32 {
    state.record_out();
    0
}

/// Out on a ball in play. With fewer than three outs, runners may move up
/// and a runner on 1st may be doubled off.
pub fn in_play_out<R: Rng + ?Sized>(
    state: &mut BaseOutState,
    config: &SimulationConfig,
    rng: &mut R,
) -> u32 {
    state.record_out();
    if state.inning_over() {
        return 0;
    }

    let mut runs = 0;
    let had_third = state.third;

    if state.second && !state.third && rng.gen::<f64>() < config.prob_advance_runner_on_out {
        state.second = false;
        state.third = true;
    }
    if had_third && rng.gen::<f64>() < config.prob_advance_runner_on_out {
        state.third = false;
        runs += 1;
    }
    if state.first && rng.gen::<f64>() < config.prob_double_play {
        state.first = false;
        state.record_out();
    }
    runs
}

/// Force advance: only runners pushed by the batter move.
pub fn walk(state: &mut BaseOutState) -> u32 {
    let mut runs = 0;
    if state.first {
        if state.second {
            if state.third {
                runs += 1;
            }
            state.third = true;
        }
        state.second = true;
    }
    state.first = true;
    runs
}

pub fn single<R: Rng + ?Sized>(
    state: &mut BaseOutState,
    config: &SimulationConfig,
    rng: &mut R,
) -> u32 {
    let mut runs = 0;

    if state.third {
        state.third = false;
        runs += 1;
    }
    if state.second {
        state.second = false;
        if rng.gen::<f64>() < config.prob_score_from_2nd_on_single {
            runs += 1;
        } else {
            state.third = true;
        }
    }
    if state.first {
        // Third is taken only if the lead runner vacated it.
        if !state.third && rng.gen::<f64>() < config.prob_1st_to_3rd {
            state.third = true;
        } else {
            state.second = true;
        }
    }
    state.first = true;
    runs
}

pub fn double<R: Rng + ?Sized>(
    state: &mut BaseOutState,
    config: &SimulationConfig,
    rng: &mut R,
) -> u32 {
    let mut runs = state.third as u32 + state.second as u32;
    state.third = false;

    if state.first {
        state.first = false;
        if rng.gen::<f64>() < config.prob_score_from_1st_on_double {
            runs += 1;
        } else {
            state.third = true;
        }
    }
    state.second = true;
    runs
}

pub fn triple(state: &mut BaseOutState) -> u32 {
    let runs = state.clear();
    state.third = true;
    runs
}

pub fn home_run(state: &mut BaseOutState) -> u32 {
    state.clear() + 1
}

/// Next inning number and whether the game is over.
#[inline]
pub fn next_inning(inning: u8, innings_per_game: u8) -> (u8, bool) {
    let next = inning.saturating_add(1);
    (next, next >= innings_per_game)
}
