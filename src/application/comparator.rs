use crate::domain::comparison::{
    ComparisonResult, ComparisonStatus, ContentEvidence, VersionEvidence,
};
use crate::domain::diff_hash::DiffHashGenerator;
use crate::domain::history::extract_history;
use crate::domain::ports::Comparator;
use crate::domain::snapshot::ObjectSnapshot;
use crate::domain::value_objects::VersionUuid;
use crate::error::{MergeError, Result};

/// Decides what happened to one object between two snapshots.
///
/// Layer 1 trusts version metadata: identical version uuids mean identical
/// content (platform guarantee), a new version whose history contains the
/// old one is a legitimate update, one that does not is a divergent edit.
/// Layer 2 refines the tentative Layer-1 verdict with content hashes so
/// metadata-only churn is not reported as a change.
///
/// Never panics on malformed input: hashing and history-parsing problems are
/// recorded as diagnostics and degrade the status toward `Unknown`/`Changed`.
/// The only `Err` is the contract violation of comparing nothing to nothing.
pub struct DualLayerComparator {
    hash_gen: DiffHashGenerator,
}

impl DualLayerComparator {
    pub fn new(hash_gen: DiffHashGenerator) -> Self {
        Self { hash_gen }
    }

    fn compare_pair(&self, old: &ObjectSnapshot, new: &ObjectSnapshot) -> ComparisonResult {
        let subject = new.object_ref();

        // Layer 1: version metadata.
        let old_v = old.version();
        let new_v = new.version();

        let (old_v, new_v) = match (old_v, new_v) {
            (Some(o), Some(n)) => (o, n),
            (o, n) => {
                let side = match (o, n) {
                    (None, None) => "both snapshots",
                    (None, _) => "old snapshot",
                    _ => "new snapshot",
                };
                return ComparisonResult {
                    status: ComparisonStatus::Unknown,
                    subject,
                    version_info: Some(VersionEvidence {
                        old_version_uuid: old.version_uuid.clone(),
                        new_version_uuid: new.version_uuid.clone(),
                        in_version_history: false,
                    }),
                    content_diff: None,
                    diagnostics: vec![format!("missing version metadata on {side}")],
                };
            }
        };

        if old_v == new_v {
            // Identical versions imply identical content; no need to hash.
            return ComparisonResult {
                status: ComparisonStatus::NotChanged,
                subject,
                version_info: Some(VersionEvidence {
                    old_version_uuid: Some(old_v.clone()),
                    new_version_uuid: Some(new_v.clone()),
                    in_version_history: false,
                }),
                content_diff: None,
                diagnostics: vec![],
            };
        }

        match extract_history(&new.raw_xml) {
            Ok(history) => {
                let mut diagnostics = history.diagnostics.clone();
                let in_history = history.contains(old_v);

                let tentative = if in_history {
                    ComparisonStatus::Changed
                } else {
                    diagnostics.push(format!(
                        "old version {old_v} not found in new version's history"
                    ));
                    ComparisonStatus::ConflictDetected
                };

                let (status, content) =
                    self.refine_with_content(old, new, tentative, &mut diagnostics);

                ComparisonResult {
                    status,
                    subject,
                    version_info: Some(VersionEvidence {
                        old_version_uuid: Some(old_v.clone()),
                        new_version_uuid: Some(new_v.clone()),
                        in_version_history: in_history,
                    }),
                    content_diff: Some(content),
                    diagnostics,
                }
            }
            Err(e) => self.compare_content_only(old, new, old_v, new_v, &e),
        }
    }

    /// Layer 2: applied only to tentative Changed/ConflictDetected verdicts.
    fn refine_with_content(
        &self,
        old: &ObjectSnapshot,
        new: &ObjectSnapshot,
        tentative: ComparisonStatus,
        diagnostics: &mut Vec<String>,
    ) -> (ComparisonStatus, ContentEvidence) {
        let old_hash = self.hash_gen.generate(&old.raw_xml);
        let new_hash = self.hash_gen.generate(&new.raw_xml);

        let content_identical =
            old_hash.is_some() && new_hash.is_some() && old_hash == new_hash;

        let status = if content_identical {
            diagnostics.push("content identical despite version uuid change".to_string());
            ComparisonStatus::NotChangedNewVuuid
        } else {
            if old_hash.is_none() || new_hash.is_none() {
                diagnostics.push(
                    "payload exceeds hashing cutoff; verdict based on version history alone"
                        .to_string(),
                );
            }
            tentative
        };

        (
            status,
            ContentEvidence {
                old_hash,
                new_hash,
                content_identical,
            },
        )
    }

    /// Fallback when the new snapshot's lineage could not be extracted at
    /// all. Without history there is no way to tell a legitimate update from
    /// a divergent one, so content evidence decides between "no functional
    /// change" and a plain `Changed` — and `Unknown` when even hashing is
    /// unavailable.
    fn compare_content_only(
        &self,
        old: &ObjectSnapshot,
        new: &ObjectSnapshot,
        old_v: &VersionUuid,
        new_v: &VersionUuid,
        cause: &MergeError,
    ) -> ComparisonResult {
        let mut diagnostics = vec![format!(
            "version history unavailable ({cause}); falling back to content comparison"
        )];

        let old_hash = self.hash_gen.generate(&old.raw_xml);
        let new_hash = self.hash_gen.generate(&new.raw_xml);

        let content_identical =
            old_hash.is_some() && new_hash.is_some() && old_hash == new_hash;

        let status = match (&old_hash, &new_hash) {
            (Some(_), Some(_)) if content_identical => {
                diagnostics.push("content identical despite version uuid change".to_string());
                ComparisonStatus::NotChangedNewVuuid
            }
            (Some(_), Some(_)) => {
                diagnostics.push(
                    "content differs but lineage is unknown; cannot distinguish a legitimate \
                     update from a conflicting one"
                        .to_string(),
                );
                ComparisonStatus::Changed
            }
            _ => {
                diagnostics.push(
                    "content hash unavailable for oversized payload; insufficient evidence"
                        .to_string(),
                );
                ComparisonStatus::Unknown
            }
        };

        ComparisonResult {
            status,
            subject: new.object_ref(),
            version_info: Some(VersionEvidence {
                old_version_uuid: Some(old_v.clone()),
                new_version_uuid: Some(new_v.clone()),
                in_version_history: false,
            }),
            content_diff: Some(ContentEvidence {
                old_hash,
                new_hash,
                content_identical,
            }),
            diagnostics,
        }
    }
}

impl Comparator for DualLayerComparator {
    fn compare(
        &self,
        old: Option<&ObjectSnapshot>,
        new: Option<&ObjectSnapshot>,
    ) -> Result<ComparisonResult> {
        match (old, new) {
            (None, None) => Err(MergeError::EmptyComparison),
            (None, Some(new)) => Ok(ComparisonResult {
                status: ComparisonStatus::New,
                subject: new.object_ref(),
                version_info: None,
                content_diff: None,
                diagnostics: vec![],
            }),
            (Some(old), None) => Ok(ComparisonResult {
                status: ComparisonStatus::Removed,
                subject: old.object_ref(),
                version_info: None,
                content_diff: None,
                diagnostics: vec![],
            }),
            (Some(old), Some(new)) => Ok(self.compare_pair(old, new)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diff_hash::MAX_HASHABLE_BYTES;
    use crate::domain::normalize::ContentNormalizer;
    use crate::domain::value_objects::{ObjectTypeName, ObjectUuid, StripRules};

    fn comparator() -> DualLayerComparator {
        let normalizer = ContentNormalizer::new(&StripRules::default()).unwrap();
        DualLayerComparator::new(DiffHashGenerator::new(normalizer))
    }

    /// Builds a snapshot whose envelope carries the version uuid, the given
    /// lineage, and a functional body.
    fn snap(uuid: &str, version: &str, lineage: &[&str], body: &str) -> ObjectSnapshot {
        let history: String = lineage
            .iter()
            .map(|v| format!("<version uuid=\"{v}\" author=\"dev\"/>"))
            .collect();
        ObjectSnapshot {
            uuid: ObjectUuid(uuid.to_string()),
            name: format!("obj-{uuid}"),
            object_type: ObjectTypeName("interface".to_string()),
            version_uuid: Some(VersionUuid(version.to_string())),
            raw_xml: format!(
                "<interface uuid=\"{uuid}\"><versionUuid>{version}</versionUuid>\
                 <history>{history}</history><rule>{body}</rule></interface>"
            ),
        }
    }

    #[test]
    fn absent_old_is_new() {
        let s = snap("x", "v1", &[], "a");
        let r = comparator().compare(None, Some(&s)).unwrap();
        assert_eq!(r.status, ComparisonStatus::New);
        assert_eq!(r.subject.uuid, ObjectUuid("x".into()));
    }

    #[test]
    fn absent_new_is_removed() {
        let s = snap("x", "v1", &[], "a");
        let r = comparator().compare(Some(&s), None).unwrap();
        assert_eq!(r.status, ComparisonStatus::Removed);
    }

    #[test]
    fn both_absent_is_a_contract_error() {
        let err = comparator().compare(None, None).unwrap_err();
        assert!(matches!(err, MergeError::EmptyComparison));
    }

    #[test]
    fn missing_version_metadata_is_unknown_with_diagnostic() {
        let old = snap("x", "v1", &[], "a");
        let mut new = snap("x", "v2", &["v1"], "b");
        new.version_uuid = None;
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::Unknown);
        assert!(!r.diagnostics.is_empty());
        assert!(r.diagnostics[0].contains("missing version metadata"));
    }

    #[test]
    fn identical_version_uuid_shortcuts_to_not_changed() {
        // Content differs, but identical versions win without hashing.
        let old = snap("x", "v1", &[], "a");
        let new = snap("x", "v1", &[], "completely different");
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::NotChanged);
        assert!(r.content_diff.is_none());
    }

    #[test]
    fn descendant_version_with_new_content_is_changed() {
        let old = snap("x", "v1", &[], "a");
        let new = snap("x", "v2", &["v1"], "b");
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::Changed);
        let v = r.version_info.unwrap();
        assert!(v.in_version_history);
        assert!(r.content_diff.unwrap().old_hash.is_some());
    }

    #[test]
    fn unrelated_version_with_new_content_is_a_conflict() {
        let old = snap("x", "v1", &[], "a");
        let new = snap("x", "v9", &["v7", "v8"], "b");
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::ConflictDetected);
        assert!(!r.diagnostics.is_empty(), "conflicts must carry diagnostics");
        assert!(r
            .diagnostics
            .iter()
            .any(|d| d.contains("not found in new version's history")));
    }

    #[test]
    fn identical_content_overrides_either_tentative_status() {
        // In-history case.
        let old = snap("x", "v1", &[], "same");
        let new = snap("x", "v2", &["v1"], "same");
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::NotChangedNewVuuid);
        assert!(r.content_diff.unwrap().content_identical);

        // Out-of-history case.
        let new = snap("x", "v9", &["v8"], "same");
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::NotChangedNewVuuid);
    }

    #[test]
    fn oversized_payload_keeps_the_history_verdict() {
        let old = snap("x", "v1", &[], "a");
        let mut new = snap("x", "v2", &["v1"], "b");
        new.raw_xml = format!(
            "<interface><history><version uuid=\"v1\"/></history><blob>{}</blob></interface>",
            "p".repeat(MAX_HASHABLE_BYTES)
        );
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::Changed);
        let c = r.content_diff.unwrap();
        assert!(c.new_hash.is_none());
        assert!(r.diagnostics.iter().any(|d| d.contains("hashing cutoff")));
    }

    #[test]
    fn unparseable_history_falls_back_to_content_equality() {
        let old = snap("x", "v1", &[], "same");
        let mut new = snap("x", "v2", &["v1"], "same");
        new.raw_xml = old.raw_xml.replace("</interface>", ""); // truncated export
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        // Normalization strips the history block, so the truncation is the
        // only difference left — still unequal content, lineage unknown.
        assert_eq!(r.status, ComparisonStatus::Changed);
        assert!(r
            .diagnostics
            .iter()
            .any(|d| d.contains("version history unavailable")));
    }

    #[test]
    fn unparseable_history_with_identical_content_is_no_functional_change() {
        let old = snap("x", "v1", &[], "same");
        let new = ObjectSnapshot {
            version_uuid: Some(VersionUuid("v2".to_string())),
            // Unbalanced tag inside an ignorable region: roxmltree rejects
            // the document, but normalization strips it before hashing.
            raw_xml: old.raw_xml.replace(
                "<history>",
                "<history><broken>",
            ),
            ..old.clone()
        };
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::NotChangedNewVuuid);
    }

    #[test]
    fn unparseable_history_and_oversized_payload_is_unknown() {
        let old = snap("x", "v1", &[], "a");
        let mut new = snap("x", "v2", &[], "b");
        new.raw_xml = format!("<interface><open>{}", "p".repeat(MAX_HASHABLE_BYTES));
        let r = comparator().compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(r.status, ComparisonStatus::Unknown);
        assert!(!r.diagnostics.is_empty());
    }

    #[test]
    fn status_is_reproducible_from_inputs() {
        let old = snap("x", "v1", &[], "a");
        let new = snap("x", "v9", &["v8"], "b");
        let c = comparator();
        let a = c.compare(Some(&old), Some(&new)).unwrap();
        let b = c.compare(Some(&old), Some(&new)).unwrap();
        assert_eq!(a.status, b.status);
        assert_eq!(a.diagnostics, b.diagnostics);
    }
}
