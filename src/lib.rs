//! dyad-score - Engagement scoring for dyad interaction interval logs
//!
//! Sessions between a CA and a peer are recorded as `.dtx` files of labeled,
//! contiguous time intervals. dyad-score reduces each session to a
//! time-weighted engagement score and aggregates scores per scenario group
//! through a deterministic pipeline: interval parsing → session scoring →
//! group aggregation → pair reporting.
//!
//! ## Modules
//!
//! - **Parsing and scoring**: [`parser`], [`scorer`], [`pipeline`]
//! - **Aggregation and reporting**: [`aggregator`], [`report`]
//! - **Session discovery**: [`discovery`] maps a data directory to pairs and groups

pub mod aggregator;
pub mod config;
pub mod discovery;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod scorer;
pub mod types;

pub use aggregator::GroupAggregator;
pub use config::Config;
pub use discovery::{SessionIndex, SessionSource};
pub use error::ScoreError;
pub use parser::IntervalParser;
pub use pipeline::{score_file, DiscontinuityPolicy, FileOutcome, ScoringOptions};
pub use report::{classify_participant, PairReport, PairReporter, RunReport};
pub use scorer::{DurationPolicy, SessionScorer};
pub use types::{GroupOutcome, GroupStatistics, ParticipantPair, WeightTable};

/// Crate version embedded in machine-readable reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for machine-readable reports
pub const PRODUCER_NAME: &str = "dyad-score";
