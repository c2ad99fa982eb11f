//! Core types for the dyad-score pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: interval records, session recordings, weight tables, scenario
//! groups and the statistics reported per group.

use crate::error::ScoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical session length in time units (six minutes of one-second ticks)
pub const CANONICAL_SESSION_DURATION: u64 = 360;

/// Number of behavioral categories a weight table covers
pub const WEIGHT_TABLE_LEN: usize = 7;

/// Default weights, category 1 first
pub const DEFAULT_WEIGHTS: [f64; WEIGHT_TABLE_LEN] = [-1.0, 0.0, 1.0, 2.0, 2.0, 3.0, 5.0];

/// Session type (scenario family)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Cognitive,
    Social,
}

impl SessionType {
    /// Short code used in filenames and report lines
    pub fn code(&self) -> &'static str {
        match self {
            SessionType::Cognitive => "cog",
            SessionType::Social => "so",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "cog" => Some(SessionType::Cognitive),
            "so" => Some(SessionType::Social),
            _ => None,
        }
    }
}

/// Where the session took place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Indoor,
    Outdoor,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Indoor => "indoor",
            Location::Outdoor => "outdoor",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "indoor" => Some(Location::Indoor),
            "outdoor" => Some(Location::Outdoor),
            _ => None,
        }
    }
}

/// Study phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Baseline,
    Intervention,
}

impl Phase {
    pub fn code(&self) -> &'static str {
        match self {
            Phase::Baseline => "base",
            Phase::Intervention => "inter",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "base" => Some(Phase::Baseline),
            "inter" => Some(Phase::Intervention),
            _ => None,
        }
    }
}

/// One reporting bucket for a participant pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioGroup {
    pub session_type: SessionType,
    pub location: Location,
    pub phase: Phase,
}

impl ScenarioGroup {
    pub const fn new(session_type: SessionType, location: Location, phase: Phase) -> Self {
        Self {
            session_type,
            location,
            phase,
        }
    }
}

/// Every scenario group in reporting order: type, then location, then phase
pub const SCENARIO_GROUPS: [ScenarioGroup; 8] = [
    ScenarioGroup::new(SessionType::Cognitive, Location::Indoor, Phase::Baseline),
    ScenarioGroup::new(SessionType::Cognitive, Location::Indoor, Phase::Intervention),
    ScenarioGroup::new(SessionType::Cognitive, Location::Outdoor, Phase::Baseline),
    ScenarioGroup::new(SessionType::Cognitive, Location::Outdoor, Phase::Intervention),
    ScenarioGroup::new(SessionType::Social, Location::Indoor, Phase::Baseline),
    ScenarioGroup::new(SessionType::Social, Location::Indoor, Phase::Intervention),
    ScenarioGroup::new(SessionType::Social, Location::Outdoor, Phase::Baseline),
    ScenarioGroup::new(SessionType::Social, Location::Outdoor, Phase::Intervention),
];

/// One labeled time segment within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRecord {
    /// Behavioral category, 1-based
    pub category: u32,
    /// Start time (time units since session start)
    pub start: u64,
    /// End time, never before `start`
    pub end: u64,
}

impl IntervalRecord {
    /// Length of the interval; zero if `end` precedes `start`
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

/// A gap or overlap between two consecutive intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscontinuityAnomaly {
    /// Line number in the source record (0 = header)
    pub line: usize,
    /// End of the previous interval
    pub expected_start: u64,
    /// Start actually recorded
    pub actual_start: u64,
}

/// Ordered intervals parsed from one session file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecording {
    pub intervals: Vec<IntervalRecord>,
    /// Sum of all interval durations
    pub total_duration: u64,
    /// Discontinuities found while parsing
    pub anomalies: Vec<DiscontinuityAnomaly>,
}

impl SessionRecording {
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_contiguous(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Whether the recording spans exactly the canonical session length
    pub fn is_canonical_length(&self) -> bool {
        self.total_duration == CANONICAL_SESSION_DURATION
    }
}

/// Category weights for one scenario family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WeightTable {
    weights: Vec<f64>,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS.to_vec(),
        }
    }
}

impl WeightTable {
    /// Build a table, requiring one finite weight per category
    pub fn new(weights: Vec<f64>) -> Result<Self, ScoreError> {
        if weights.len() != WEIGHT_TABLE_LEN {
            return Err(ScoreError::InvalidWeights(format!(
                "expected {} weights, got {}",
                WEIGHT_TABLE_LEN,
                weights.len()
            )));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite()) {
            return Err(ScoreError::InvalidWeights(format!(
                "weight {} is not finite",
                bad
            )));
        }
        Ok(Self { weights })
    }

    /// Weight for a 1-based category
    pub fn weight(&self, category: u32) -> Result<f64, ScoreError> {
        (category as usize)
            .checked_sub(1)
            .and_then(|idx| self.weights.get(idx))
            .copied()
            .ok_or(ScoreError::UnknownCategory {
                category,
                table_len: self.weights.len(),
            })
    }

    pub fn min(&self) -> f64 {
        self.weights.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.weights.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}

impl TryFrom<Vec<f64>> for WeightTable {
    type Error = ScoreError;

    fn try_from(weights: Vec<f64>) -> Result<Self, Self::Error> {
        WeightTable::new(weights)
    }
}

impl From<WeightTable> for Vec<f64> {
    fn from(table: WeightTable) -> Self {
        table.weights
    }
}

/// Parses a comma-separated list such as `"0,-1,1,2,2,3,5"`
impl FromStr for WeightTable {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let weights = s
            .split(',')
            .map(|token| {
                token.trim().parse::<f64>().map_err(|_| {
                    ScoreError::InvalidWeights(format!("'{}' is not a number", token.trim()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        WeightTable::new(weights)
    }
}

impl fmt::Display for WeightTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.weights.iter().map(|w| w.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Summary statistics for the valid sessions of one scenario group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStatistics {
    pub mean: f64,
    /// Bessel-corrected sample standard deviation; `None` for a single sample
    pub std_dev: Option<f64>,
    /// `std_dev / sqrt(kept_count)`; `None` for a single sample
    pub standard_error: Option<f64>,
    /// Sessions that produced a defined score
    pub kept_count: usize,
    /// Sessions considered, including undefined ones
    pub total_count: usize,
}

/// Result of aggregating one scenario group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    /// No session yielded a defined score
    NoData { total_count: usize },
    Stats(GroupStatistics),
}

impl GroupOutcome {
    pub fn statistics(&self) -> Option<&GroupStatistics> {
        match self {
            GroupOutcome::Stats(stats) => Some(stats),
            GroupOutcome::NoData { .. } => None,
        }
    }
}

/// Training status of a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Training {
    Trained,
    Untrained,
}

impl Training {
    pub fn as_str(&self) -> &'static str {
        match self {
            Training::Trained => "Trained",
            Training::Untrained => "Untrained",
        }
    }
}

/// A CA and the peer they interacted with
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantPair {
    pub ca: String,
    pub peer: String,
}

impl ParticipantPair {
    pub fn new(ca: impl Into<String>, peer: impl Into<String>) -> Self {
        Self {
            ca: ca.into(),
            peer: peer.into(),
        }
    }
}

impl fmt::Display for ParticipantPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ca, self.peer)
    }
}
