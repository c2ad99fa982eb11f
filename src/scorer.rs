//! Session scoring
//!
//! Reduces a parsed session to a single engagement score: the time-weighted
//! average of category weights,
//! `sum(weight[category] * duration) / sum(duration)`.

use crate::error::ScoreError;
use crate::types::{SessionRecording, WeightTable};
use serde::{Deserialize, Serialize};

/// Whether a session's total duration is checked before scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Any positive total duration is scored
    #[default]
    Unconstrained,
    /// Sessions not spanning exactly `expected` time units score undefined
    Canonical { expected: u64 },
}

impl DurationPolicy {
    pub fn accepts(&self, total_duration: u64) -> bool {
        match self {
            DurationPolicy::Unconstrained => true,
            DurationPolicy::Canonical { expected } => total_duration == *expected,
        }
    }
}

/// Scorer for parsed session recordings
pub struct SessionScorer;

impl SessionScorer {
    /// Score a session with no duration constraint.
    ///
    /// Returns `Ok(None)` when the session has zero total duration.
    pub fn score(recording: &SessionRecording, weights: &WeightTable) -> Result<Option<f64>, ScoreError> {
        Self::score_with_policy(recording, weights, DurationPolicy::Unconstrained)
    }

    /// Score a session, treating a duration rejected by `policy` as undefined
    pub fn score_with_policy(
        recording: &SessionRecording,
        weights: &WeightTable,
        policy: DurationPolicy,
    ) -> Result<Option<f64>, ScoreError> {
        let mut numerator = 0.0;
        let mut denominator = 0u64;

        for (idx, interval) in recording.intervals.iter().enumerate() {
            // Data lines follow the header, so interval N sits on line N + 1
            let line = idx + 1;
            if interval.end < interval.start {
                return Err(ScoreError::malformed(
                    line,
                    format!("interval ends at {} before it starts at {}", interval.end, interval.start),
                ));
            }
            let weight = weights.weight(interval.category)?;
            let duration = interval.duration();
            numerator += weight * duration as f64;
            denominator = denominator
                .checked_add(duration)
                .ok_or_else(|| ScoreError::malformed(line, "total duration overflows"))?;
        }

        if denominator == 0 {
            return Ok(None);
        }
        if !policy.accepts(denominator) {
            log::debug!(
                "session duration {} rejected by {:?}",
                denominator,
                policy
            );
            return Ok(None);
        }

        Ok(Some(numerator / denominator as f64))
    }
}
