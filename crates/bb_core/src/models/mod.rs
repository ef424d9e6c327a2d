pub mod batter;
pub mod lineup;
pub mod result;

pub use batter::{BatterProfile, Outcome, SeasonStats, OUTCOME_COUNT, PROBABILITY_TOLERANCE};
pub use lineup::{Lineup, LINEUP_SIZE};
pub use result::SimulationResult;
