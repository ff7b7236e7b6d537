use std::collections::BTreeMap;

use crate::domain::change::MergeChangeset;
use crate::domain::comparison::ComparisonResult;
use crate::domain::report::{ImpactThresholds, MergeReport, StatusBreakdown};

/// Rolls per-object outcomes into the summary the review UI shows first.
pub struct ReportAggregator {
    thresholds: ImpactThresholds,
}

impl ReportAggregator {
    pub fn new(thresholds: ImpactThresholds) -> Self {
        Self { thresholds }
    }

    /// Bucket a changeset by classification and object type.
    ///
    /// Conservation property: the classification counters and the object-type
    /// buckets each sum to the number of `Change` records.
    pub fn aggregate(&self, changeset: &MergeChangeset) -> MergeReport {
        let mut by_object_type: BTreeMap<String, usize> = BTreeMap::new();
        for change in &changeset.changes {
            *by_object_type
                .entry(change.subject.object_type.0.clone())
                .or_insert(0) += 1;
        }

        let totals = changeset.summary.clone();
        let conflict_density = if totals.total_changes == 0 {
            0.0
        } else {
            totals.conflict_count as f64 / totals.total_changes as f64
        };
        let impact = self
            .thresholds
            .assess(totals.conflict_count, totals.total_changes);

        MergeReport {
            totals,
            by_object_type,
            conflict_density,
            impact,
        }
    }
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self::new(ImpactThresholds::default())
    }
}

/// Bucket raw pairwise results by status (used when a caller runs the
/// comparator outside the three-way pipeline).
pub fn summarize_results(results: &[ComparisonResult]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();
    for result in results {
        breakdown.record(result.status);
    }
    breakdown
}
