use std::str::FromStr;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::snapshot::ObjectRef;
use crate::error::MergeError;

/// How an object changed from the base package (A) to the new vendor
/// package (C), independent of any customer edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaCategory {
    New,
    Modified,
    Deprecated,
}

impl DeltaCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeltaCategory::New => "NEW",
            DeltaCategory::Modified => "MODIFIED",
            DeltaCategory::Deprecated => "DEPRECATED",
        }
    }
}

impl FromStr for DeltaCategory {
    type Err = MergeError;

    /// Strings arrive from persisted `Change` rows; anything outside the
    /// three known categories is a caller bug, never a silent default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(DeltaCategory::New),
            "MODIFIED" => Ok(DeltaCategory::Modified),
            "DEPRECATED" => Ok(DeltaCategory::Deprecated),
            other => Err(MergeError::InvalidDeltaCategory(other.to_string())),
        }
    }
}

/// Final merge outcome for one object in the three-way working set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    New,
    NoConflict,
    Conflict,
    Deleted,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::New => "NEW",
            Classification::NoConflict => "NO_CONFLICT",
            Classification::Conflict => "CONFLICT",
            Classification::Deleted => "DELETED",
        }
    }
}

impl FromStr for Classification {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Classification::New),
            "NO_CONFLICT" => Ok(Classification::NoConflict),
            "CONFLICT" => Ok(Classification::Conflict),
            "DELETED" => Ok(Classification::Deleted),
            other => Err(MergeError::InvalidClassification(other.to_string())),
        }
    }
}

/// What the customer did to a delta object in their package (B).
/// `None` on a `Change` means the object does not exist in B at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerChangeType {
    Modified,
    Unmodified,
}

/// Per-object outcome of the full three-package pipeline, ready for the
/// caller to persist.
#[derive(Debug, Clone, Serialize)]
pub struct Change {
    /// Internal id resolved through the caller's `IdResolver`, when one was
    /// supplied.
    pub object_id: Option<i64>,
    pub subject: ObjectRef,
    pub classification: Classification,
    pub vendor_change_type: DeltaCategory,
    pub customer_change_type: Option<CustomerChangeType>,
    pub exists_in_customer: bool,
    /// Layer-1 flag from the A→C comparison.
    pub version_changed: bool,
    /// Layer-2 flag from the A→C comparison.
    pub content_changed: bool,
    /// Stable ordering for UI paging: position in the ascending-uuid scan of
    /// the A∪C union at first discovery.
    pub display_order: u32,
    pub diagnostics: Vec<String>,
}

/// The `Change` collection for one merge session plus computed counters.
///
/// Counter invariant: every counter equals the cardinality of `changes`
/// partitioned by classification — enforced by construction, since the
/// summary is derived from the collection and never mutated independently.
#[derive(Debug, Clone, Serialize)]
pub struct MergeChangeset {
    pub changeset_id: String,
    pub created_at: String,
    pub changes: Vec<Change>,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_changes: usize,
    pub new_count: usize,
    pub no_conflict_count: usize,
    pub conflict_count: usize,
    pub deleted_count: usize,
}

impl MergeChangeset {
    pub fn new(changes: Vec<Change>) -> Self {
        let count = |c: Classification| changes.iter().filter(|ch| ch.classification == c).count();
        let summary = Summary {
            total_changes: changes.len(),
            new_count: count(Classification::New),
            no_conflict_count: count(Classification::NoConflict),
            conflict_count: count(Classification::Conflict),
            deleted_count: count(Classification::Deleted),
        };

        MergeChangeset {
            changeset_id: format!(
                "merge_{}_{}",
                Utc::now().format("%Y%m%d_%H%M%S"),
                Uuid::new_v4().simple()
            ),
            created_at: Utc::now().to_rfc3339(),
            changes,
            summary,
        }
    }
}
