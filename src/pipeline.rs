//! Pipeline orchestration
//!
//! Runs single session files through parsing and scoring, containing every
//! per-file failure so that one bad file never aborts a group.
//!
//! Pipeline stages:
//! 1. IntervalParser - Read the file into a session recording
//! 2. Discontinuity policy - Warn about or reject non-contiguous sessions
//! 3. SessionScorer - Reduce the recording to a weighted score

use crate::error::ScoreError;
use crate::parser::IntervalParser;
use crate::scorer::{DurationPolicy, SessionScorer};
use crate::types::{SessionRecording, WeightTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a gap or overlap between consecutive intervals is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscontinuityPolicy {
    /// Log the anomaly and score the literal intervals
    #[default]
    Warn,
    /// Fail the file
    Reject,
}

/// Per-run scoring options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoringOptions {
    pub duration_policy: DurationPolicy,
    pub discontinuity_policy: DiscontinuityPolicy,
}

/// Outcome of scoring one session file
#[derive(Debug)]
pub enum FileOutcome {
    /// A defined score
    Scored(f64),
    /// Zero duration, or a duration rejected by the duration policy
    Undefined,
    /// Parsing or scoring failed; the file contributes nothing
    Failed(ScoreError),
}

impl FileOutcome {
    /// The score, if one was produced
    pub fn score(&self) -> Option<f64> {
        match self {
            FileOutcome::Scored(score) => Some(*score),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed(_))
    }
}

/// A scored file, kept for reporting
#[derive(Debug)]
pub struct ScoredFile {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// Score a parsed recording under the given options
pub fn score_recording(
    recording: &SessionRecording,
    weights: &WeightTable,
    options: &ScoringOptions,
) -> Result<Option<f64>, ScoreError> {
    if options.discontinuity_policy == DiscontinuityPolicy::Reject {
        if let Some(anomaly) = recording.anomalies.first() {
            return Err(ScoreError::Discontinuity {
                line: anomaly.line,
                expected: anomaly.expected_start,
                actual: anomaly.actual_start,
            });
        }
    }

    SessionScorer::score_with_policy(recording, weights, options.duration_policy)
}

/// Parse and score one session file, containing any failure
pub fn score_file(path: &Path, weights: &WeightTable, options: &ScoringOptions) -> FileOutcome {
    let result = IntervalParser::parse_file(path)
        .and_then(|recording| score_recording(&recording, weights, options));

    match result {
        Ok(Some(score)) => FileOutcome::Scored(score),
        Ok(None) => {
            log::info!("{}: score undefined, session excluded", path.display());
            FileOutcome::Undefined
        }
        Err(e) => {
            log::warn!("{}: {}", path.display(), e);
            FileOutcome::Failed(e)
        }
    }
}

/// Score every file of a group in order
pub fn score_files(paths: &[PathBuf], weights: &WeightTable, options: &ScoringOptions) -> Vec<ScoredFile> {
    paths
        .iter()
        .map(|path| ScoredFile {
            path: path.clone(),
            outcome: score_file(path, weights, options),
        })
        .collect()
}
