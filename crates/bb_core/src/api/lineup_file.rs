//! Lineup file format.
//!
//! A lineup file is JSON, either a bare array of entries or an object with a
//! `lineup` array:
//!
//! ```json
//! { "lineup": [
//!     { "name": "Leadoff", "probabilities": [0.18, 0.42, 0.10, 0.20, 0.06, 0.01, 0.03] },
//!     { "name": "Cleanup", "stats": { "plate_appearances": 600, "hits": 160,
//!       "doubles": 30, "triples": 2, "home_runs": 35, "walks": 70, "strikeouts": 140 } }
//! ] }
//! ```
//!
//! Entries may mix explicit probabilities and season stats. The file format
//! does not enforce nine entries; `simulate` does.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::json_api::LineupEntry;
use crate::error::Result;
use crate::models::BatterProfile;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LineupFile {
    Entries(Vec<LineupEntry>),
    Wrapped { lineup: Vec<LineupEntry> },
}

impl LineupFile {
    fn into_entries(self) -> Vec<LineupEntry> {
        match self {
            LineupFile::Entries(entries) => entries,
            LineupFile::Wrapped { lineup } => lineup,
        }
    }
}

/// Convert entries into validated profiles, in order.
pub fn convert_entries(entries: Vec<LineupEntry>) -> Result<Vec<BatterProfile>> {
    entries.into_iter().map(LineupEntry::into_profile).collect()
}

/// Parse lineup JSON text (either layout).
pub fn parse_lineup(json: &str) -> Result<Vec<BatterProfile>> {
    let file: LineupFile = serde_json::from_str(json)?;
    convert_entries(file.into_entries())
}

pub fn load_lineup_file(path: impl AsRef<Path>) -> Result<Vec<BatterProfile>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let profiles = parse_lineup(&content)?;
    debug!(path = %path.display(), batters = profiles.len(), "lineup loaded");
    Ok(profiles)
}
