//! Group aggregation
//!
//! Combines the session scores of one scenario group into mean, sample
//! standard deviation and standard error of the mean.

use crate::types::{GroupOutcome, GroupStatistics};

/// Aggregator for per-group session scores
pub struct GroupAggregator;

impl GroupAggregator {
    /// Aggregate scores, skipping undefined and NaN entries.
    ///
    /// With a single defined score the standard deviation and standard error
    /// are `None`.
    pub fn aggregate(scores: &[Option<f64>]) -> GroupOutcome {
        let total_count = scores.len();
        let kept: Vec<f64> = scores
            .iter()
            .flatten()
            .copied()
            .filter(|s| !s.is_nan())
            .collect();

        if kept.is_empty() {
            return GroupOutcome::NoData { total_count };
        }

        let n = kept.len() as f64;
        let mean = kept.iter().sum::<f64>() / n;

        let std_dev = if kept.len() > 1 {
            let variance = kept.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Some(variance.sqrt())
        } else {
            None
        };

        GroupOutcome::Stats(GroupStatistics {
            mean,
            std_dev,
            standard_error: std_dev.map(|sd| sd / n.sqrt()),
            kept_count: kept.len(),
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_undefined_scores() {
        let outcome = GroupAggregator::aggregate(&[Some(0.2), Some(0.4), None, Some(0.6)]);
        let stats = outcome.statistics().unwrap();

        assert_eq!(stats.kept_count, 3);
        assert_eq!(stats.total_count, 4);
        assert!((stats.mean - 0.4).abs() < 1e-12);
        assert!((stats.std_dev.unwrap() - 0.2).abs() < 1e-12);
        assert!((stats.standard_error.unwrap() - 0.2 / 3f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_nan_counts_as_undefined() {
        let outcome = GroupAggregator::aggregate(&[Some(f64::NAN), Some(1.0), Some(3.0)]);
        let stats = outcome.statistics().unwrap();

        assert_eq!(stats.kept_count, 2);
        assert_eq!(stats.total_count, 3);
        assert!((stats.mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample() {
        let outcome = GroupAggregator::aggregate(&[Some(0.7)]);
        let stats = outcome.statistics().unwrap();

        assert_eq!(stats.mean, 0.7);
        assert_eq!(stats.kept_count, 1);
        assert_eq!(stats.total_count, 1);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.standard_error, None);
    }

    #[test]
    fn test_no_data() {
        assert_eq!(
            GroupAggregator::aggregate(&[]),
            GroupOutcome::NoData { total_count: 0 }
        );
        assert_eq!(
            GroupAggregator::aggregate(&[None, Some(f64::NAN)]),
            GroupOutcome::NoData { total_count: 2 }
        );
    }

    #[test]
    fn test_standard_error_shrinks_with_more_samples() {
        let small: Vec<Option<f64>> = [1.0, -1.0].iter().map(|&s| Some(s)).collect();
        let large: Vec<Option<f64>> = [1.0, -1.0].iter().cycle().take(8).map(|&s| Some(s)).collect();

        let se_small = GroupAggregator::aggregate(&small)
            .statistics()
            .and_then(|s| s.standard_error)
            .unwrap();
        let se_large = GroupAggregator::aggregate(&large)
            .statistics()
            .and_then(|s| s.standard_error)
            .unwrap();

        assert!(se_small >= 0.0);
        assert!(se_large >= 0.0);
        assert!(se_large < se_small);
    }

    #[test]
    fn test_identical_scores_have_zero_error() {
        let outcome = GroupAggregator::aggregate(&[Some(1.5), Some(1.5), Some(1.5)]);
        let stats = outcome.statistics().unwrap();
        assert_eq!(stats.standard_error, Some(0.0));
    }
}
