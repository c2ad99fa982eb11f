//! Pair reporting
//!
//! Drives scoring and aggregation over the fixed list of scenario groups for a
//! participant pair, and renders one summary line per group that has data.

use crate::aggregator::GroupAggregator;
use crate::discovery::SessionSource;
use crate::pipeline::{score_files, ScoringOptions};
use crate::types::{
    GroupOutcome, GroupStatistics, ParticipantPair, ScenarioGroup, SessionType, Training,
    WeightTable, SCENARIO_GROUPS,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classify a participant by the first character of their identifier.
///
/// Identifiers starting with `u` through `z` belong to trained participants.
pub fn classify_participant(id: &str) -> Training {
    match id.chars().next() {
        Some('u'..='z') => Training::Trained,
        _ => Training::Untrained,
    }
}

/// Statistics for one scenario group of a pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    #[serde(flatten)]
    pub group: ScenarioGroup,
    #[serde(flatten)]
    pub statistics: GroupStatistics,
    /// Files that failed to parse or score
    pub failed_files: Vec<String>,
}

impl ScenarioReport {
    /// Render as `type location phase: mean +/- se  [kept/total]`
    pub fn render_line(&self) -> String {
        let stats = &self.statistics;
        let standard_error = match stats.standard_error {
            Some(se) => format!("{:.3}", se),
            None => "n/a".to_string(),
        };
        format!(
            "{:3} {:7} {:5}: {:6.3} +/- {}  [{}/{}]",
            self.group.session_type.code(),
            self.group.location.as_str(),
            self.group.phase.code(),
            stats.mean,
            standard_error,
            stats.kept_count,
            stats.total_count
        )
    }
}

/// Report for one participant pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairReport {
    pub pair: ParticipantPair,
    /// Training status of the peer
    pub training: Training,
    /// Groups with at least one defined score, in reporting order
    pub scenarios: Vec<ScenarioReport>,
}

impl PairReport {
    pub fn header(&self) -> String {
        format!("{} {} ({})", self.pair.ca, self.pair.peer, self.training.as_str())
    }

    /// Header followed by one line per scenario
    pub fn render(&self) -> Vec<String> {
        std::iter::once(self.header())
            .chain(self.scenarios.iter().map(ScenarioReport::render_line))
            .collect()
    }
}

/// Envelope for machine-readable output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub producer: String,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub pairs: Vec<PairReport>,
}

impl RunReport {
    pub fn new(pairs: Vec<PairReport>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            producer: crate::PRODUCER_NAME.to_string(),
            version: crate::VERSION.to_string(),
            generated_at: Utc::now(),
            pairs,
        }
    }
}

/// Reporter for participant pairs over a session source
pub struct PairReporter<'a> {
    source: &'a dyn SessionSource,
    options: ScoringOptions,
}

impl<'a> PairReporter<'a> {
    pub fn new(source: &'a dyn SessionSource, options: ScoringOptions) -> Self {
        Self { source, options }
    }

    /// Report every scenario group of `pair` that has at least one defined score
    pub fn report(
        &self,
        pair: &ParticipantPair,
        cognitive_weights: &WeightTable,
        social_weights: &WeightTable,
    ) -> PairReport {
        let mut scenarios = Vec::new();

        for group in SCENARIO_GROUPS.iter() {
            let weights = match group.session_type {
                SessionType::Cognitive => cognitive_weights,
                SessionType::Social => social_weights,
            };

            if let Some(scenario) = self.report_group(pair, group, weights) {
                scenarios.push(scenario);
            }
        }

        PairReport {
            pair: pair.clone(),
            training: classify_participant(&pair.peer),
            scenarios,
        }
    }

    /// Score and aggregate one group; `None` when there is nothing to report
    pub fn report_group(
        &self,
        pair: &ParticipantPair,
        group: &ScenarioGroup,
        weights: &WeightTable,
    ) -> Option<ScenarioReport> {
        let paths = self.source.sessions_for(pair, group);
        if paths.is_empty() {
            return None;
        }

        let scored = score_files(&paths, weights, &self.options);
        let scores: Vec<Option<f64>> = scored.iter().map(|f| f.outcome.score()).collect();

        match GroupAggregator::aggregate(&scores) {
            GroupOutcome::Stats(statistics) => Some(ScenarioReport {
                group: *group,
                statistics,
                failed_files: scored
                    .iter()
                    .filter(|f| f.outcome.is_failed())
                    .map(|f| f.path.display().to_string())
                    .collect(),
            }),
            GroupOutcome::NoData { total_count } => {
                log::info!(
                    "{} {} {} {}: no valid sessions out of {}",
                    pair,
                    group.session_type.code(),
                    group.location.as_str(),
                    group.phase.code(),
                    total_count
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::SessionIndex;
    use crate::types::{Location, Phase};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_session(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), format!("cat,beg,end\n{}*\n", body)).unwrap();
    }

    #[test]
    fn test_classify_participant() {
        assert_eq!(classify_participant("ulrich"), Training::Trained);
        assert_eq!(classify_participant("zara"), Training::Trained);
        assert_eq!(classify_participant("wendy"), Training::Trained);
        assert_eq!(classify_participant("lydia"), Training::Untrained);
        assert_eq!(classify_participant("Ulrich"), Training::Untrained);
        assert_eq!(classify_participant(""), Training::Untrained);
    }

    #[test]
    fn test_render_line() {
        let scenario = ScenarioReport {
            group: ScenarioGroup::new(SessionType::Social, Location::Indoor, Phase::Baseline),
            statistics: GroupStatistics {
                mean: 0.4,
                std_dev: Some(0.2),
                standard_error: Some(0.2 / 3f64.sqrt()),
                kept_count: 3,
                total_count: 4,
            },
            failed_files: vec![],
        };
        assert_eq!(scenario.render_line(), "so  indoor  base :  0.400 +/- 0.115  [3/4]");

        let single = ScenarioReport {
            group: ScenarioGroup::new(SessionType::Cognitive, Location::Outdoor, Phase::Intervention),
            statistics: GroupStatistics {
                mean: -0.6667,
                std_dev: None,
                standard_error: None,
                kept_count: 1,
                total_count: 1,
            },
            failed_files: vec![],
        };
        assert_eq!(single.render_line(), "cog outdoor inter: -0.667 +/- n/a  [1/1]");
    }

    #[test]
    fn test_report_pair() {
        let dir = tempdir().unwrap();
        // cog indoor base: scores 2.0 and 3.0
        write_session(dir.path(), "cog-1-base-a-albert-ulrich-indoor.dtx", "4,0,360\n");
        write_session(dir.path(), "cog-2-base-a-albert-ulrich-indoor.dtx", "6,0,180\n6,180,360\n");
        // cog indoor base: unknown category, counted but not kept
        write_session(dir.path(), "cog-3-base-a-albert-ulrich-indoor.dtx", "9,0,360\n");
        // so outdoor inter: weight of category 1 differs between tables
        write_session(dir.path(), "so-1-inter-a-albert-ulrich-outdoor.dtx", "1,0,360\n");
        // so indoor base: only an empty session, no line
        write_session(dir.path(), "so-1-base-a-albert-ulrich-indoor.dtx", "");
        // other pair
        write_session(dir.path(), "cog-1-base-a-albert-lydia-indoor.dtx", "7,0,360\n");

        let index = SessionIndex::scan(dir.path()).unwrap();
        let reporter = PairReporter::new(&index, ScoringOptions::default());

        let cognitive: WeightTable = "0,-1,1,2,2,3,5".parse().unwrap();
        let social = WeightTable::default();
        let report = reporter.report(&ParticipantPair::new("albert", "ulrich"), &cognitive, &social);

        assert_eq!(report.training, Training::Trained);
        assert_eq!(report.scenarios.len(), 2);

        let cog = &report.scenarios[0];
        assert_eq!(
            cog.group,
            ScenarioGroup::new(SessionType::Cognitive, Location::Indoor, Phase::Baseline)
        );
        assert_eq!(cog.statistics.kept_count, 2);
        assert_eq!(cog.statistics.total_count, 3);
        assert!((cog.statistics.mean - 2.5).abs() < 1e-12);
        assert_eq!(cog.failed_files.len(), 1);

        let so = &report.scenarios[1];
        assert_eq!(
            so.group,
            ScenarioGroup::new(SessionType::Social, Location::Outdoor, Phase::Intervention)
        );
        assert_eq!(so.statistics.mean, -1.0);

        assert_eq!(
            report.render(),
            vec![
                "albert ulrich (Trained)".to_string(),
                "cog indoor  base :  2.500 +/- 0.500  [2/3]".to_string(),
                "so  outdoor inter: -1.000 +/- n/a  [1/1]".to_string(),
            ]
        );
    }

    #[test]
    fn test_pair_without_sessions_has_no_lines() {
        let index = SessionIndex::default();
        let reporter = PairReporter::new(&index, ScoringOptions::default());
        let weights = WeightTable::default();

        let report = reporter.report(&ParticipantPair::new("chris", "nellie"), &weights, &weights);
        assert!(report.scenarios.is_empty());
        assert_eq!(report.render(), vec!["chris nellie (Untrained)".to_string()]);
    }

    #[test]
    fn test_run_report_serializes() {
        let report = RunReport::new(vec![PairReport {
            pair: ParticipantPair::new("dana", "xavier"),
            training: Training::Trained,
            scenarios: vec![ScenarioReport {
                group: ScenarioGroup::new(SessionType::Cognitive, Location::Indoor, Phase::Baseline),
                statistics: GroupStatistics {
                    mean: 1.0,
                    std_dev: None,
                    standard_error: None,
                    kept_count: 1,
                    total_count: 1,
                },
                failed_files: vec![],
            }],
        }]);

        let value: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["producer"], "dyad-score");
        let scenario = &value["pairs"][0]["scenarios"][0];
        assert_eq!(scenario["session_type"], "cognitive");
        assert_eq!(scenario["phase"], "baseline");
        assert_eq!(scenario["kept_count"], 1);
        assert!(scenario["standard_error"].is_null());
    }
}
