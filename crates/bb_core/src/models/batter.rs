//! Batter outcome profiles.
//!
//! A [`BatterProfile`] is the fixed 7-bucket outcome distribution for one
//! lineup slot. Profiles are immutable once built and are shared read-only by
//! every simulated game.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Number of plate-appearance outcome buckets.
pub const OUTCOME_COUNT: usize = 7;

/// Allowed deviation of the probability sum from 1.0.
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Result of a single plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Strikeout,
    InPlayOut,
    Walk,
    Single,
    Double,
    Triple,
    HomeRun,
}

impl Outcome {
    /// Bucket order of the probability vector.
    pub const ALL: [Outcome; OUTCOME_COUNT] = [
        Outcome::Strikeout,
        Outcome::InPlayOut,
        Outcome::Walk,
        Outcome::Single,
        Outcome::Double,
        Outcome::Triple,
        Outcome::HomeRun,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Outcome> {
        Self::ALL.get(index).copied()
    }

    pub fn is_hit(self) -> bool {
        matches!(
            self,
            Outcome::Single | Outcome::Double | Outcome::Triple | Outcome::HomeRun
        )
    }

    pub fn is_out(self) -> bool {
        matches!(self, Outcome::Strikeout | Outcome::InPlayOut)
    }

    /// Bases awarded to the batter (4 = scores).
    pub fn bases(self) -> u8 {
        match self {
            Outcome::Strikeout | Outcome::InPlayOut => 0,
            Outcome::Walk | Outcome::Single => 1,
            Outcome::Double => 2,
            Outcome::Triple => 3,
            Outcome::HomeRun => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Strikeout => "strikeout",
            Outcome::InPlayOut => "in_play_out",
            Outcome::Walk => "walk",
            Outcome::Single => "single",
            Outcome::Double => "double",
            Outcome::Triple => "triple",
            Outcome::HomeRun => "home_run",
        }
    }
}

/// Raw season counting stats for one batter.
///
/// `hits` includes extra-base hits; singles are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStats {
    pub plate_appearances: u32,
    pub hits: u32,
    #[serde(default)]
    pub doubles: u32,
    #[serde(default)]
    pub triples: u32,
    #[serde(default)]
    pub home_runs: u32,
    #[serde(default)]
    pub walks: u32,
    #[serde(default)]
    pub strikeouts: u32,
}

impl SeasonStats {
    pub fn extra_base_hits(&self) -> u32 {
        self.doubles
            .saturating_add(self.triples)
            .saturating_add(self.home_runs)
    }

    pub fn singles(&self) -> Option<u32> {
        self.hits.checked_sub(self.extra_base_hits())
    }
}

#[derive(Deserialize)]
struct BatterProfileData {
    name: String,
    probabilities: [f64; OUTCOME_COUNT],
}

/// Outcome distribution for one lineup slot, indexed by [`Outcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BatterProfileData")]
pub struct BatterProfile {
    name: String,
    probabilities: [f64; OUTCOME_COUNT],
    #[serde(skip)]
    cumulative: [f64; OUTCOME_COUNT],
}

impl TryFrom<BatterProfileData> for BatterProfile {
    type Error = SimError;

    fn try_from(data: BatterProfileData) -> Result<Self> {
        BatterProfile::new(data.name, data.probabilities)
    }
}

impl BatterProfile {
    /// Build a profile from an explicit probability vector.
    ///
    /// Rejects negative or non-finite entries and vectors whose sum is not
    /// 1.0 within [`PROBABILITY_TOLERANCE`].
    pub fn new(name: impl Into<String>, probabilities: [f64; OUTCOME_COUNT]) -> Result<Self> {
        let name = name.into();

        if let Some((i, p)) = probabilities
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(SimError::InvalidProbabilities {
                batter: name,
                reason: format!("{} probability is {}", Outcome::ALL[i].label(), p),
            });
        }

        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(SimError::InvalidProbabilities {
                batter: name,
                reason: format!("probabilities sum to {sum:.9}, expected 1.0"),
            });
        }

        let cumulative = build_cumulative(&probabilities);
        Ok(Self { name, probabilities, cumulative })
    }

    /// Derive a profile from season counting stats.
    ///
    /// Every outcome rate is `count / plate_appearances`; the in-play-out rate
    /// is the residual, clamped at zero. A batter with no plate appearances
    /// always makes an in-play out.
    pub fn from_season_stats(name: impl Into<String>, stats: &SeasonStats) -> Result<Self> {
        let name = name.into();

        if stats.plate_appearances == 0 {
            return Self::new(name, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        }

        let Some(singles) = stats.singles() else {
            return Err(SimError::InvalidSeasonStats {
                batter: name,
                reason: format!(
                    "extra-base hits ({}) exceed hits ({})",
                    stats.extra_base_hits(),
                    stats.hits
                ),
            });
        };

        let pa = stats.plate_appearances as f64;
        let rate = |count: u32| count as f64 / pa;

        let strikeout = rate(stats.strikeouts);
        let walk = rate(stats.walks);
        let single = rate(singles);
        let double = rate(stats.doubles);
        let triple = rate(stats.triples);
        let home_run = rate(stats.home_runs);

        let others = strikeout + walk + single + double + triple + home_run;
        if others > 1.0 + PROBABILITY_TOLERANCE {
            return Err(SimError::InvalidSeasonStats {
                batter: name,
                reason: format!(
                    "outcome rates sum to {others:.6} over {} plate appearances",
                    stats.plate_appearances
                ),
            });
        }
        let in_play_out = (1.0 - others).max(0.0);

        Self::new(
            name,
            [strikeout, in_play_out, walk, single, double, triple, home_run],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn probabilities(&self) -> &[f64; OUTCOME_COUNT] {
        &self.probabilities
    }

    pub fn probability(&self, outcome: Outcome) -> f64 {
        self.probabilities[outcome.index()]
    }

    /// Cumulative distribution; the last reachable bucket is pinned to 1.0.
    pub fn cumulative(&self) -> &[f64; OUTCOME_COUNT] {
        &self.cumulative
    }

    /// Map a uniform draw in `[0, 1)` to an outcome.
    #[inline]
    pub fn outcome_for(&self, u: f64) -> Outcome {
        for (i, &c) in self.cumulative.iter().enumerate() {
            if u < c {
                return Outcome::ALL[i];
            }
        }
        Outcome::HomeRun
    }

    /// On-base probability (everything except the two out buckets).
    pub fn on_base_probability(&self) -> f64 {
        1.0 - self.probability(Outcome::Strikeout) - self.probability(Outcome::InPlayOut)
    }
}

fn build_cumulative(probabilities: &[f64; OUTCOME_COUNT]) -> [f64; OUTCOME_COUNT] {
    let mut cumulative = [0.0; OUTCOME_COUNT];
    let mut acc = 0.0;
    for (c, p) in cumulative.iter_mut().zip(probabilities) {
        acc += p;
        *c = acc;
    }

    // Float drift must not leave a gap below 1.0 or hand it to an empty bucket.
    let last = probabilities
        .iter()
        .rposition(|&p| p > 0.0)
        .unwrap_or(OUTCOME_COUNT - 1);
    for c in cumulative.iter_mut().skip(last) {
        *c = 1.0;
    }
    cumulative
}
