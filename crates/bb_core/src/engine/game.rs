//! Single-game state machine.
//!
//! [`GameStateMachine::step`] advances one game by one step: the steal phase,
//! then (if the half-inning is still alive) one plate appearance, then the
//! inning rollover. All runner movement is delegated to [`super::rules`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::SimulationConfig;
use super::rules::{self, BaseOutState, StealAttempt, StealTarget};
use crate::models::{Lineup, Outcome, LINEUP_SIZE};

/// Mutable state of one simulated game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Completed innings.
    pub inning: u8,
    pub bases: BaseOutState,
    /// Lineup slot due up, in `[0, 9)`.
    pub batter_index: u8,
    pub score: u32,
    pub finished: bool,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn outs(&self) -> u8 {
        self.bases.outs
    }

    pub fn on_first(&self) -> bool {
        self.bases.first
    }

    pub fn on_second(&self) -> bool {
        self.bases.second
    }

    pub fn on_third(&self) -> bool {
        self.bases.third
    }
}

/// What happened during one [`GameStateMachine::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Steal attempts in [`StealTarget::ORDER`] slots.
    pub steals: [Option<StealAttempt>; 3],
    /// Lineup slot that batted, if the batter came up.
    pub batter_index: Option<u8>,
    pub outcome: Option<Outcome>,
    pub runs: u32,
    pub double_play: bool,
    pub inning_ended: bool,
    /// Runners left on base when the inning ended.
    pub stranded: u32,
    pub game_over: bool,
}

impl StepReport {
    pub fn steal_attempts(&self) -> impl Iterator<Item = &StealAttempt> {
        self.steals.iter().flatten()
    }
}

/// Counting totals for one game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTally {
    pub plate_appearances: u32,
    pub hits: u32,
    pub home_runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub steal_attempts: u32,
    pub stolen_bases: u32,
    pub caught_stealing: u32,
    pub double_plays: u32,
    pub left_on_base: u32,
    pub runs: u32,
}

impl GameTally {
    pub fn record(&mut self, report: &StepReport) {
        for attempt in report.steal_attempts() {
            self.steal_attempts += 1;
            if attempt.success {
                self.stolen_bases += 1;
            } else {
                self.caught_stealing += 1;
            }
        }
        if let Some(outcome) = report.outcome {
            self.plate_appearances += 1;
            match outcome {
                Outcome::Strikeout => self.strikeouts += 1,
                Outcome::Walk => self.walks += 1,
                Outcome::HomeRun => self.home_runs += 1,
                _ => {}
            }
            if outcome.is_hit() {
                self.hits += 1;
            }
        }
        self.double_plays += report.double_play as u32;
        self.left_on_base += report.stranded;
        self.runs += report.runs;
    }
}

/// Full step-by-step record of one game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameLog {
    pub steps: Vec<StepReport>,
    pub tally: GameTally,
    pub score: u32,
}

/// Drives one [`GameState`] through the canonical rules.
pub struct GameStateMachine<'a> {
    lineup: &'a Lineup,
    config: &'a SimulationConfig,
    state: GameState,
}

impl<'a> GameStateMachine<'a> {
    pub fn new(lineup: &'a Lineup, config: &'a SimulationConfig) -> Self {
        Self { lineup, config, state: GameState::new() }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Advance by one step. A finished game is left untouched.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> StepReport {
        let mut report = StepReport::default();
        if self.state.finished {
            report.game_over = true;
            return report;
        }

        let config = self.config;
        let mut bases = self.state.bases;
        let mut runs = 0;

        for (slot, target) in StealTarget::ORDER.into_iter().enumerate() {
            if target.eligible(&bases) {
                let attempt = rules::attempt_steal(&mut bases, target, config, rng);
                runs += attempt.runs();
                report.steals[slot] = Some(attempt);
            }
        }

        // Caught stealing for the third out: nobody bats, and the same slot
        // leads off the next inning.
        if !bases.inning_over() {
            let batter = self.state.batter_index;
            let outcome = self.lineup.outcome_for(batter as usize, rng.gen::<f64>());
            let outs_before = bases.outs;
            runs += rules::resolve_outcome(&mut bases, outcome, config, rng);

            report.batter_index = Some(batter);
            report.outcome = Some(outcome);
            report.double_play = outcome == Outcome::InPlayOut && bases.outs - outs_before == 2;
            self.state.batter_index = (batter + 1) % LINEUP_SIZE as u8;
        }

        self.state.bases = bases;
        self.state.score += runs;
        report.runs = runs;

        if bases.inning_over() {
            report.inning_ended = true;
            report.stranded = bases.occupied();
            self.end_inning();
        }
        report.game_over = self.state.finished;
        report
    }

    fn end_inning(&mut self) {
        let (inning, finished) = rules::next_inning(self.state.inning, self.config.innings_per_game);
        self.state.inning = inning;
        self.state.bases = BaseOutState::default();
        self.state.finished = finished;
    }

    /// Play the current game to the end and return the final score.
    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> u32 {
        while !self.state.finished {
            self.step(rng);
        }
        self.state.score
    }

    /// Play the current game to the end, keeping every step report.
    pub fn play_with_log<R: Rng + ?Sized>(&mut self, rng: &mut R) -> GameLog {
        let mut log = GameLog::default();
        while !self.state.finished {
            let report = self.step(rng);
            log.tally.record(&report);
            log.steps.push(report);
        }
        log.score = self.state.score;
        log
    }
}

/// Play one fresh game and return its step log.
pub fn simulate_game_with_log<R: Rng + ?Sized>(
    lineup: &Lineup,
    config: &SimulationConfig,
    rng: &mut R,
) -> GameLog {
    GameStateMachine::new(lineup, config).play_with_log(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BatterProfile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn lineup_of(p: [f64; 7]) -> Lineup {
        Lineup::uniform(&BatterProfile::new("B", p).unwrap())
    }

    #[test]
    fn test_all_strikeouts_is_perfect_game() {
        let lineup = lineup_of([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let log = simulate_game_with_log(&lineup, &config, &mut rng);

        assert_eq!(log.score, 0);
        assert_eq!(log.tally.plate_appearances, 27);
        assert_eq!(log.tally.strikeouts, 27);
        assert_eq!(log.steps.iter().filter(|s| s.inning_ended).count(), 9);
        assert!(log.steps.last().unwrap().game_over);
    }

    #[test]
    fn test_batter_index_wraps() {
        let lineup = lineup_of([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut machine = GameStateMachine::new(&lineup, &config);
        for expected in (0..12).map(|i| i % 9) {
            let report = machine.step(&mut rng);
            assert_eq!(report.batter_index, Some(expected as u8));
        }
        // 12 outs: four innings done, slot 3 due up.
        assert_eq!(machine.state().inning, 4);
        assert_eq!(machine.state().batter_index, 3);
    }

    #[test]
    fn test_innings_config_respected() {
        let lineup = lineup_of([0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let config = SimulationConfig::default().with_innings(3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let log = simulate_game_with_log(&lineup, &config, &mut rng);
        assert_eq!(log.tally.plate_appearances, 9);
        assert_eq!(log.score, 0);
    }

    #[test]
    fn test_home_run_step_scores_runners_plus_one() {
        let lineup = lineup_of([0.2, 0.3, 0.1, 0.2, 0.1, 0.05, 0.05]);
        let config = SimulationConfig {
            prob_steal_2nd: 1.0,
            prob_steal_3rd: 1.0,
            prob_steal_home: 1.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut machine = GameStateMachine::new(&lineup, &config);
        let mut seen = 0;
        for _ in 0..200 {
            machine.reset();
            while !machine.is_finished() {
                let score_before = machine.state().score;
                let report = machine.step(&mut rng);
                if report.outcome == Some(Outcome::HomeRun) {
                    let steal_runs: u32 = report.steal_attempts().map(|a| a.runs()).sum();
                    assert!(report.runs > steal_runs);
                    assert_eq!(machine.state().score - score_before, report.runs);
                    assert!(machine.state().bases.is_empty());
                    seen += 1;
                }
            }
        }
        assert!(seen > 0);
    }

    #[test]
    fn test_caught_stealing_third_out_skips_batter() {
        // Everyone walks; every steal fails.
        let lineup = lineup_of([0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let config = SimulationConfig {
            prob_steal_2nd: 0.0,
            prob_steal_3rd: 0.0,
            prob_steal_home: 0.0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut machine = GameStateMachine::new(&lineup, &config);

        // Walk, caught + walk, caught + walk, caught (third out, no batter).
        let r1 = machine.step(&mut rng);
        assert_eq!(r1.outcome, Some(Outcome::Walk));
        let r2 = machine.step(&mut rng);
        assert_eq!(r2.steal_attempts().count(), 1);
        assert_eq!(r2.outcome, Some(Outcome::Walk));
        let _r3 = machine.step(&mut rng);
        let r4 = machine.step(&mut rng);
        assert!(r4.inning_ended);
        assert_eq!(r4.outcome, None);
        assert_eq!(r4.batter_index, None);
        assert_eq!(machine.state().batter_index, 3);
        assert_eq!(machine.state().inning, 1);

        let log = machine.play_with_log(&mut rng);
        assert_eq!(log.score, 0);
        assert_eq!(machine.state().inning, 9);
    }

    #[test]
    fn test_finished_game_is_inert() {
        let lineup = lineup_of([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let config = SimulationConfig::default().with_innings(1);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut machine = GameStateMachine::new(&lineup, &config);
        machine.play(&mut rng);
        let before = *machine.state();
        let report = machine.step(&mut rng);
        assert!(report.game_over);
        assert_eq!(report.outcome, None);
        assert_eq!(*machine.state(), before);
    }

    #[test]
    fn test_tally_matches_score() {
        let lineup = lineup_of([0.15, 0.50, 0.15, 0.15, 0.045, 0.005, 0.0]);
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..100 {
            let log = simulate_game_with_log(&lineup, &config, &mut rng);
            assert_eq!(log.tally.runs, log.score);
            assert_eq!(log.tally.home_runs, 0);
            assert_eq!(
                log.tally.steal_attempts,
                log.tally.stolen_bases + log.tally.caught_stealing
            );
        }
    }
}
