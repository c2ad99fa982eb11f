//! Run configuration
//!
//! Configuration is read from a JSON file; every field is optional and falls
//! back to its default. Command-line flags override file values.

use crate::error::ScoreError;
use crate::pipeline::{DiscontinuityPolicy, ScoringOptions};
use crate::scorer::DurationPolicy;
use crate::types::WeightTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default directory holding `.dtx` session files
pub const DEFAULT_DATA_DIR: &str = "./vis_project_data";

/// Settings for one scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for session files
    pub data_dir: PathBuf,
    /// Weights applied to cognitive sessions
    pub cognitive_weights: WeightTable,
    /// Weights applied to social sessions
    pub social_weights: WeightTable,
    /// Required total session length; unset means any length is scored
    pub canonical_duration: Option<u64>,
    /// Fail sessions whose intervals are not contiguous
    pub strict_continuity: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cognitive_weights: WeightTable::default(),
            social_weights: WeightTable::default(),
            canonical_duration: None,
            strict_continuity: false,
        }
    }
}

impl Config {
    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ScoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.canonical_duration == Some(0) {
            return Err(ScoreError::InvalidConfig(
                "canonical_duration must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn scoring_options(&self) -> ScoringOptions {
        ScoringOptions {
            duration_policy: match self.canonical_duration {
                Some(expected) => DurationPolicy::Canonical { expected },
                None => DurationPolicy::Unconstrained,
            },
            discontinuity_policy: if self.strict_continuity {
                DiscontinuityPolicy::Reject
            } else {
                DiscontinuityPolicy::Warn
            },
        }
    }
}
