use chrono::{DateTime, Utc};

use crate::error::{MergeError, Result};
use crate::domain::value_objects::VersionUuid;

/// One entry in an object's platform-recorded version lineage.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionEntry {
    pub version_uuid: VersionUuid,
    pub timestamp: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

/// Ordered version lineage parsed from an object's XML envelope.
///
/// Append-only and produced by the platform; this crate only reads it.
/// `diagnostics` records entries that had to be skipped (missing uuid) or
/// partially read (unparseable timestamp).
#[derive(Debug, Clone, Default)]
pub struct VersionHistory {
    pub entries: Vec<VersionEntry>,
    pub diagnostics: Vec<String>,
}

impl VersionHistory {
    /// Exact string match against every recorded version uuid.
    /// `false` (not an error) when the history is empty.
    pub fn contains(&self, target: &VersionUuid) -> bool {
        self.entries.iter().any(|e| e.version_uuid == *target)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Parse the version lineage out of an object's raw XML.
///
/// Returns `Err(MergeError::MalformedXml)` only when the document cannot be
/// parsed at all — the comparator treats that differently from an object
/// that simply has no `<history>` block (`Ok` with zero entries), because
/// Layer 1 degrades to content-only comparison in the former case.
///
/// Entry shape is lenient about the export dialect: the uuid may sit in a
/// `uuid`/`versionUuid` attribute or in a `<versionUuid>` child element,
/// timestamps are RFC 3339, authors come from an `author` attribute or child.
pub fn extract_history(raw_xml: &str) -> Result<VersionHistory> {
    let doc = roxmltree::Document::parse(raw_xml)
        .map_err(|e| MergeError::MalformedXml(e.to_string()))?;

    let mut history = VersionHistory::default();
    let Some(history_node) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "history")
    else {
        return Ok(history);
    };

    for (idx, entry) in history_node
        .children()
        .filter(|n| n.is_element())
        .enumerate()
    {
        let uuid = entry
            .attribute("uuid")
            .or_else(|| entry.attribute("versionUuid"))
            .map(str::to_string)
            .or_else(|| child_text(&entry, "versionUuid"));

        let Some(uuid) = uuid.filter(|u| !u.trim().is_empty()) else {
            history
                .diagnostics
                .push(format!("history entry {idx} skipped: no version uuid"));
            continue;
        };

        let timestamp = match entry.attribute("timestamp") {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    history.diagnostics.push(format!(
                        "history entry {idx}: unparseable timestamp {raw:?} ({e})"
                    ));
                    None
                }
            },
            None => None,
        };

        let author = entry
            .attribute("author")
            .map(str::to_string)
            .or_else(|| child_text(&entry, "author"));

        history.entries.push(VersionEntry {
            version_uuid: VersionUuid(uuid),
            timestamp,
            author,
        });
    }

    Ok(history)
}

fn child_text(node: &roxmltree::Node, name: &str) -> Option<String> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
        .and_then(|c| c.text())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = concat!(
        "<interface uuid=\"u1\"><versionUuid>v3</versionUuid><history>",
        "<version uuid=\"v1\" timestamp=\"2024-03-01T10:00:00Z\" author=\"alice\"/>",
        "<version uuid=\"v2\" author=\"bob\"/>",
        "</history><rule>x</rule></interface>",
    );

    #[test]
    fn extracts_ordered_entries() {
        let h = extract_history(XML).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.entries[0].version_uuid, VersionUuid("v1".into()));
        assert_eq!(h.entries[0].author.as_deref(), Some("alice"));
        assert!(h.entries[0].timestamp.is_some());
        assert_eq!(h.entries[1].version_uuid, VersionUuid("v2".into()));
        assert!(h.entries[1].timestamp.is_none());
        assert!(h.diagnostics.is_empty());
    }

    #[test]
    fn contains_is_exact_match() {
        let h = extract_history(XML).unwrap();
        assert!(h.contains(&VersionUuid("v1".into())));
        assert!(!h.contains(&VersionUuid("v".into())));
        assert!(!h.contains(&VersionUuid("V1".into())));
    }

    #[test]
    fn uuid_in_child_element_is_accepted() {
        let xml = "<x><history><entry><versionUuid>v9</versionUuid></entry></history></x>";
        let h = extract_history(xml).unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.entries[0].version_uuid, VersionUuid("v9".into()));
    }

    #[test]
    fn entry_without_uuid_is_skipped_with_diagnostic() {
        let xml = "<x><history><version author=\"eve\"/><version uuid=\"v1\"/></history></x>";
        let h = extract_history(xml).unwrap();
        assert_eq!(h.len(), 1);
        assert_eq!(h.diagnostics.len(), 1);
        assert!(h.diagnostics[0].contains("no version uuid"));
    }

    #[test]
    fn bad_timestamp_keeps_entry_with_diagnostic() {
        let xml = "<x><history><version uuid=\"v1\" timestamp=\"yesterday\"/></history></x>";
        let h = extract_history(xml).unwrap();
        assert_eq!(h.len(), 1);
        assert!(h.entries[0].timestamp.is_none());
        assert_eq!(h.diagnostics.len(), 1);
    }

    #[test]
    fn missing_history_block_is_empty_not_error() {
        let h = extract_history("<x><rule>1</rule></x>").unwrap();
        assert!(h.is_empty());
        assert!(!h.contains(&VersionUuid("v1".into())));
    }

    #[test]
    fn unparseable_document_is_a_distinct_failure() {
        let err = extract_history("<x><history></x>").unwrap_err();
        assert!(matches!(err, MergeError::MalformedXml(_)));
    }
}
