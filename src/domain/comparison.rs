use serde::Serialize;

use crate::domain::snapshot::ObjectRef;
use crate::domain::value_objects::{DiffHash, VersionUuid};

/// Outcome of comparing two snapshots of one object (or the absence of one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparisonStatus {
    /// Present on the new side only.
    New,
    /// Versions differ and the old version is part of the new version's
    /// lineage: a legitimate update.
    Changed,
    /// Versions differ and the old version is *not* in the new version's
    /// lineage: divergent edits.
    ConflictDetected,
    /// Version uuids are identical.
    NotChanged,
    /// Version metadata churned but the normalized content is identical.
    NotChangedNewVuuid,
    /// Present on the old side only.
    Removed,
    /// Version metadata was missing or evidence was insufficient to decide.
    Unknown,
}

/// Layer-1 evidence: what the version metadata said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEvidence {
    pub old_version_uuid: Option<VersionUuid>,
    pub new_version_uuid: Option<VersionUuid>,
    pub in_version_history: bool,
}

/// Layer-2 evidence: what the content hashes said. A `None` hash means the
/// payload was oversized and hashing was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentEvidence {
    pub old_hash: Option<DiffHash>,
    pub new_hash: Option<DiffHash>,
    pub content_identical: bool,
}

/// The full explanation of one pairwise comparison.
///
/// `status` is a pure function of the two input snapshots: same inputs, same
/// result, no hidden state. `diagnostics` is always non-empty for
/// `ConflictDetected` and `Unknown` — a conflict the UI cannot explain to a
/// reviewer is a defect.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub status: ComparisonStatus,
    pub subject: ObjectRef,
    pub version_info: Option<VersionEvidence>,
    pub content_diff: Option<ContentEvidence>,
    pub diagnostics: Vec<String>,
}

impl ComparisonResult {
    /// Whether this result keeps the object in the vendor delta set. Only
    /// `NotChanged` is excluded: `Unknown` verdicts stay in so reviewers see
    /// the objects needing manual attention along with their diagnostics.
    pub fn is_delta_relevant(&self) -> bool {
        self.status != ComparisonStatus::NotChanged
    }

    /// Layer-1 verdict: did the version metadata change?
    pub fn version_changed(&self) -> bool {
        self.version_info
            .as_ref()
            .map(|v| v.old_version_uuid != v.new_version_uuid)
            .unwrap_or(false)
    }

    /// Layer-2 verdict: did the normalized content change? `false` when the
    /// hashes were equal or unavailable.
    pub fn content_changed(&self) -> bool {
        self.content_diff
            .as_ref()
            .map(|c| !c.content_identical && c.old_hash.is_some() && c.new_hash.is_some())
            .unwrap_or(false)
    }
}
