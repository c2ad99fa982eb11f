//! Error types for dyad-score

use thiserror::Error;

/// Errors that can occur while scoring sessions
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed interval on line {line}: {reason}")]
    MalformedInterval { line: usize, reason: String },

    #[error("Discontinuity on line {line}: expected start {expected}, got {actual}")]
    Discontinuity {
        line: usize,
        expected: u64,
        actual: u64,
    },

    #[error("Unknown category {category}: weight table has {table_len} entries")]
    UnknownCategory { category: u32, table_len: usize },

    #[error("Invalid weight table: {0}")]
    InvalidWeights(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScoreError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        ScoreError::MalformedInterval {
            line,
            reason: reason.into(),
        }
    }
}
