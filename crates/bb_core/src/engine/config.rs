//! Simulation configuration.
//!
//! Every secondary base-running event is an independent probability in
//! `[0, 1]`. The struct is owned by the caller and read-only during a run.
//!
//! ```rust
//! use bb_core::engine::SimulationConfig;
//!
//! let config = SimulationConfig::default();
//! let fast = SimulationConfig::aggressive();
//! assert!(fast.prob_1st_to_3rd > config.prob_1st_to_3rd);
//! ```

use serde::{Deserialize, Serialize};
use std::env::{self, VarError};
use std::fs;
use tracing::debug;

use crate::error::{Result, SimError};

/// Path to a JSON config file picked up by [`SimulationConfig::from_env`].
pub const CONFIG_PATH_ENV: &str = "BB_SIM_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Innings per game (default: 9)
    pub innings_per_game: u8,
    /// Runner on 2nd/3rd moves up on an in-play out (default: 0.5)
    pub prob_advance_runner_on_out: f64,
    /// Double play on an in-play out with a runner on 1st (default: 0.3)
    pub prob_double_play: f64,
    /// Steal of 2nd succeeds (default: 0.75)
    pub prob_steal_2nd: f64,
    /// Steal of 3rd succeeds (default: 0.70)
    pub prob_steal_3rd: f64,
    /// Steal of home succeeds (default: 0.60)
    pub prob_steal_home: f64,
    /// Runner on 1st reaches 3rd on a single (default: 0.3)
    pub prob_1st_to_3rd: f64,
    /// Runner on 2nd scores on a single (default: 0.6)
    pub prob_score_from_2nd_on_single: f64,
    /// Runner on 1st scores on a double (default: 0.4)
    pub prob_score_from_1st_on_double: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            innings_per_game: 9,
            prob_advance_runner_on_out: 0.5,
            prob_double_play: 0.3,
            prob_steal_2nd: 0.75,
            prob_steal_3rd: 0.70,
            prob_steal_home: 0.60,
            prob_1st_to_3rd: 0.3,
            prob_score_from_2nd_on_single: 0.6,
            prob_score_from_1st_on_double: 0.4,
        }
    }
}

impl SimulationConfig {
    pub fn realistic() -> Self {
        Self::default()
    }

    /// Aggressive base running: more extra bases, better jumps.
    pub fn aggressive() -> Self {
        Self {
            prob_advance_runner_on_out: 0.65,
            prob_steal_2nd: 0.85,
            prob_steal_3rd: 0.80,
            prob_steal_home: 0.70,
            prob_1st_to_3rd: 0.45,
            prob_score_from_2nd_on_single: 0.75,
            prob_score_from_1st_on_double: 0.55,
            ..Self::default()
        }
    }

    /// Station-to-station base running.
    pub fn conservative() -> Self {
        Self {
            prob_advance_runner_on_out: 0.35,
            prob_steal_2nd: 0.65,
            prob_steal_3rd: 0.60,
            prob_steal_home: 0.50,
            prob_1st_to_3rd: 0.15,
            prob_score_from_2nd_on_single: 0.45,
            prob_score_from_1st_on_double: 0.25,
            ..Self::default()
        }
    }

    pub fn with_innings(mut self, innings: u8) -> Self {
        self.innings_per_game = innings;
        self
    }

    /// Named probability fields, in declaration order.
    pub fn probabilities(&self) -> [(&'static str, f64); 8] {
        [
            ("prob_advance_runner_on_out", self.prob_advance_runner_on_out),
            ("prob_double_play", self.prob_double_play),
            ("prob_steal_2nd", self.prob_steal_2nd),
            ("prob_steal_3rd", self.prob_steal_3rd),
            ("prob_steal_home", self.prob_steal_home),
            ("prob_1st_to_3rd", self.prob_1st_to_3rd),
            ("prob_score_from_2nd_on_single", self.prob_score_from_2nd_on_single),
            ("prob_score_from_1st_on_double", self.prob_score_from_1st_on_double),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        if self.innings_per_game == 0 {
            return Err(SimError::InvalidConfig { field: "innings_per_game", value: 0.0 });
        }
        for (field, value) in self.probabilities() {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidConfig { field, value });
            }
        }
        Ok(())
    }

    /// Parse and validate a (possibly partial) JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load from `BB_SIM_CONFIG_PATH` when set, otherwise the default.
    ///
    /// A path that is not valid Unicode is an error, not a silent default.
    pub fn from_env() -> Result<Self> {
        Self::from_env_value(env::var(CONFIG_PATH_ENV))
    }

    fn from_env_value(value: std::result::Result<String, VarError>) -> Result<Self> {
        let path = match value {
            Ok(path) => path,
            Err(VarError::NotPresent) => return Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => {
                return Err(SimError::InvalidEnvVar {
                    name: CONFIG_PATH_ENV,
                    value: raw.to_string_lossy().into_owned(),
                })
            }
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        debug!(path, "loading simulation config from {CONFIG_PATH_ENV}");
        Self::from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.innings_per_game, 9);
        assert!((cfg.prob_double_play - 0.3).abs() < 1e-12);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_presets_are_ordered() {
        let realistic = SimulationConfig::realistic();
        let aggressive = SimulationConfig::aggressive();
        let conservative = SimulationConfig::conservative();

        assert!(aggressive.prob_1st_to_3rd > realistic.prob_1st_to_3rd);
        assert!(conservative.prob_1st_to_3rd < realistic.prob_1st_to_3rd);
        assert!(aggressive.validate().is_ok());
        assert!(conservative.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let cfg = SimulationConfig { prob_steal_home: 1.2, ..Default::default() };
        match cfg.validate() {
            Err(SimError::InvalidConfig { field, value }) => {
                assert_eq!(field, "prob_steal_home");
                assert!((value - 1.2).abs() < 1e-12);
            }
            other => panic!("unexpected: {other:?}"),
        }

        let nan = SimulationConfig { prob_double_play: f64::NAN, ..Default::default() };
        assert!(nan.validate().is_err());

        let zero = SimulationConfig::default().with_innings(0);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = SimulationConfig::from_json(r#"{"innings_per_game": 7, "prob_double_play": 0.0}"#)
            .unwrap();
        assert_eq!(cfg.innings_per_game, 7);
        assert_eq!(cfg.prob_double_play, 0.0);
        assert!((cfg.prob_steal_2nd - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_json_roundtrip_and_invalid() {
        let cfg = SimulationConfig::aggressive();
        let parsed = SimulationConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(parsed, cfg);

        assert!(SimulationConfig::from_json(r#"{"prob_1st_to_3rd": -0.1}"#).is_err());
        assert!(SimulationConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"prob_steal_2nd": 0.9}}"#).unwrap();
        let cfg = SimulationConfig::from_file(file.path()).unwrap();
        assert!((cfg.prob_steal_2nd - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_env_path_unset_or_blank_uses_default() {
        let unset = SimulationConfig::from_env_value(Err(VarError::NotPresent)).unwrap();
        assert_eq!(unset, SimulationConfig::default());
        let blank = SimulationConfig::from_env_value(Ok("  ".to_string())).unwrap();
        assert_eq!(blank, SimulationConfig::default());
    }

    #[test]
    fn test_env_path_loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"prob_steal_3rd": 0.5}}"#).unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let cfg = SimulationConfig::from_env_value(Ok(path)).unwrap();
        assert!((cfg.prob_steal_3rd - 0.5).abs() < 1e-12);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_env_path_is_an_error() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![b'c', 0xff, b'g']);
        let err = SimulationConfig::from_env_value(Err(VarError::NotUnicode(raw))).unwrap_err();
        assert!(
            matches!(err, SimError::InvalidEnvVar { name: CONFIG_PATH_ENV, .. }),
            "{err}"
        );
        assert!(err.is_validation());
    }
}
