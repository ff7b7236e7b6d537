use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::change::Summary;
use crate::domain::comparison::ComparisonStatus;

/// Risk level derived from how much of the working set is conflicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Conflict-density thresholds for the impact assessment.
///
/// Impact is monotonic in density: no conflicts is always `Low`, and a given
/// input always maps to the same level. Thresholds are a policy choice, so
/// they live in configuration; these defaults match the documented policy
/// (< 10% → Medium, < 25% → High, otherwise Critical).
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct ImpactThresholds {
    #[serde(default = "default_medium_below")]
    pub medium_below: f64,
    #[serde(default = "default_high_below")]
    pub high_below: f64,
}

fn default_medium_below() -> f64 {
    0.10
}

fn default_high_below() -> f64 {
    0.25
}

impl Default for ImpactThresholds {
    fn default() -> Self {
        Self {
            medium_below: default_medium_below(),
            high_below: default_high_below(),
        }
    }
}

impl ImpactThresholds {
    pub fn assess(&self, conflict_count: usize, total_count: usize) -> ImpactLevel {
        if conflict_count == 0 || total_count == 0 {
            return ImpactLevel::Low;
        }
        let density = conflict_count as f64 / total_count as f64;
        if density < self.medium_below {
            ImpactLevel::Medium
        } else if density < self.high_below {
            ImpactLevel::High
        } else {
            ImpactLevel::Critical
        }
    }
}

/// Rolled-up view of a merge changeset for the summary screen.
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub totals: Summary,
    /// Change counts bucketed by the vendor's object-type tag.
    pub by_object_type: BTreeMap<String, usize>,
    pub conflict_density: f64,
    pub impact: ImpactLevel,
}

/// Per-status counts over raw pairwise comparison results.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusBreakdown {
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}

impl StatusBreakdown {
    pub fn record(&mut self, status: ComparisonStatus) {
        let key = serde_json::to_value(status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{status:?}"));
        *self.counts.entry(key).or_insert(0) += 1;
        self.total += 1;
    }
}
