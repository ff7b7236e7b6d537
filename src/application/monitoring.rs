use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{info, instrument};

use crate::domain::comparison::ComparisonResult;
use crate::domain::ports::Comparator;
use crate::domain::snapshot::ObjectSnapshot;
use crate::error::Result;

// ─── PerfReport ──────────────────────────────────────────────────────────────

/// A single timed comparison.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OpTiming {
    /// Uuid of the object that was compared.
    pub object: String,
    /// Elapsed wall time in milliseconds.
    pub duration_ms: u128,
    /// Final status, as its serialized name.
    pub status: String,
    /// Combined size of both raw payloads in bytes.
    pub bytes: usize,
}

/// Accumulated timings for one merge run.
///
/// Shared across worker threads via `Arc<Mutex<_>>`; with a thousand-object
/// wall-clock budget, per-object timings are how embedders find the outliers.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct PerfReport {
    pub timings: Vec<OpTiming>,
    pub total_compares: usize,
    pub total_ms: u128,
}

impl PerfReport {
    pub fn new() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::default()))
    }

    fn record(report: &Arc<Mutex<Self>>, timing: OpTiming) {
        if let Ok(mut r) = report.lock() {
            r.total_ms += timing.duration_ms;
            r.total_compares += 1;
            r.timings.push(timing);
        }
    }
}

// ─── MonitoringComparator ────────────────────────────────────────────────────

/// Decorator: wraps any `Comparator`, measures wall time per `compare` call,
/// and appends the result to the shared `PerfReport`.
pub struct MonitoringComparator {
    inner: Arc<dyn Comparator>,
    report: Arc<Mutex<PerfReport>>,
}

impl MonitoringComparator {
    pub fn new(inner: Arc<dyn Comparator>, report: Arc<Mutex<PerfReport>>) -> Self {
        Self { inner, report }
    }
}

impl Comparator for MonitoringComparator {
    #[instrument(
        name = "compare",
        skip(self, old, new),
        fields(
            object.uuid = old.or(new).map(|s| s.uuid.as_str()).unwrap_or("-"),
        ),
        level = "debug"
    )]
    fn compare(
        &self,
        old: Option<&ObjectSnapshot>,
        new: Option<&ObjectSnapshot>,
    ) -> Result<ComparisonResult> {
        let uuid = old
            .or(new)
            .map(|s| s.uuid.as_str().to_string())
            .unwrap_or_default();
        let bytes = old.map_or(0, |s| s.raw_xml.len()) + new.map_or(0, |s| s.raw_xml.len());

        let start = Instant::now();
        let result = self.inner.compare(old, new)?;
        let duration_ms = start.elapsed().as_millis();

        info!(object = %uuid, status = ?result.status, bytes, duration_ms, "compare completed");

        PerfReport::record(
            &self.report,
            OpTiming {
                object: uuid,
                duration_ms,
                status: format!("{:?}", result.status),
                bytes,
            },
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::comparator::DualLayerComparator;
    use crate::domain::comparison::ComparisonStatus;
    use crate::domain::diff_hash::DiffHashGenerator;
    use crate::domain::normalize::ContentNormalizer;
    use crate::domain::value_objects::{ObjectTypeName, ObjectUuid, StripRules, VersionUuid};

    fn snap(uuid: &str) -> ObjectSnapshot {
        ObjectSnapshot {
            uuid: ObjectUuid(uuid.to_string()),
            name: uuid.to_string(),
            object_type: ObjectTypeName("rule".to_string()),
            version_uuid: Some(VersionUuid("v1".to_string())),
            raw_xml: "<rule/>".to_string(),
        }
    }

    #[test]
    fn records_one_timing_per_compare() {
        let normalizer = ContentNormalizer::new(&StripRules::default()).unwrap();
        let inner = Arc::new(DualLayerComparator::new(DiffHashGenerator::new(normalizer)));
        let report = PerfReport::new();
        let monitored = MonitoringComparator::new(inner, Arc::clone(&report));

        let s = snap("a");
        let r = monitored.compare(None, Some(&s)).unwrap();
        assert_eq!(r.status, ComparisonStatus::New);
        let r = monitored.compare(Some(&s), None).unwrap();
        assert_eq!(r.status, ComparisonStatus::Removed);

        let perf = report.lock().unwrap();
        assert_eq!(perf.total_compares, 2);
        assert_eq!(perf.timings.len(), 2);
        assert_eq!(perf.timings[0].object, "a");
    }
}
