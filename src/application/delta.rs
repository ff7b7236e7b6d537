use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::change::{CustomerChangeType, DeltaCategory};
use crate::domain::comparison::ComparisonStatus;
use crate::domain::ports::{Comparator, SnapshotSource};
use crate::domain::snapshot::ObjectRef;
use crate::domain::value_objects::ObjectUuid;
use crate::error::Result;

/// One object's place in the three-way working set, produced by the delta
/// scan and consumed by the classification engine.
#[derive(Debug, Clone)]
pub struct DeltaEntry {
    pub subject: ObjectRef,
    pub category: DeltaCategory,
    /// Layer-1 flag from the A→C comparison (`false` for New/Deprecated).
    pub version_changed: bool,
    /// Layer-2 flag from the A→C comparison (`false` for New/Deprecated).
    pub content_changed: bool,
    pub exists_in_customer: bool,
    pub customer_modified: bool,
    pub customer_change_type: Option<CustomerChangeType>,
    /// Position in the ascending-uuid scan of A∪C at first discovery.
    pub display_order: u32,
    pub diagnostics: Vec<String>,
}

/// Orchestrates pairwise comparison across the three package snapshots.
///
/// Step 1 diffs base (A) against the new vendor release (C) to get the
/// vendor delta; objects the vendor did not touch are excluded outright and
/// never checked against the customer package. Step 2 diffs the delta set
/// against the customer package (B) to see which of the vendor's changes
/// land on customer-modified objects.
///
/// Per-object work has no data dependency across uuids, so both steps fan
/// out over a rayon pool; only the step ordering itself is sequential.
pub struct PackageDeltaService {
    comparator: Arc<dyn Comparator>,
}

impl PackageDeltaService {
    pub fn new(comparator: Arc<dyn Comparator>) -> Self {
        Self { comparator }
    }

    pub fn compare_packages(
        &self,
        base: &dyn SnapshotSource,
        customer: &dyn SnapshotSource,
        vendor: &dyn SnapshotSource,
    ) -> Result<Vec<DeltaEntry>> {
        let delta = self.vendor_delta(base, vendor)?;
        info!(delta_objects = delta.len(), "vendor delta computed");
        let delta = self.customer_overlay(delta, base, customer)?;
        Ok(delta)
    }

    /// Step 1: A→C. The union of both uuid sets is scanned in ascending
    /// order, which makes `display_order` deterministic for a given input.
    fn vendor_delta(
        &self,
        base: &dyn SnapshotSource,
        vendor: &dyn SnapshotSource,
    ) -> Result<Vec<DeltaEntry>> {
        let union: Vec<ObjectUuid> = {
            let mut uuids = base.uuids();
            uuids.extend(vendor.uuids());
            uuids.into_iter().collect()
        };
        debug!(objects = union.len(), "scanning base∪vendor union");

        let scanned: Vec<Option<DeltaEntry>> = union
            .par_iter()
            .map(|uuid| self.scan_one(uuid, base, vendor))
            .collect::<Result<_>>()?;

        let mut delta: Vec<DeltaEntry> = scanned.into_iter().flatten().collect();
        for (order, entry) in delta.iter_mut().enumerate() {
            entry.display_order = order as u32;
        }
        Ok(delta)
    }

    fn scan_one(
        &self,
        uuid: &ObjectUuid,
        base: &dyn SnapshotSource,
        vendor: &dyn SnapshotSource,
    ) -> Result<Option<DeltaEntry>> {
        let entry = match (base.get(uuid), vendor.get(uuid)) {
            (None, Some(added)) => Some(self.blank_entry(added.object_ref(), DeltaCategory::New)),
            (Some(dropped), None) => {
                Some(self.blank_entry(dropped.object_ref(), DeltaCategory::Deprecated))
            }
            (Some(old), Some(new)) => {
                let result = self.comparator.compare(Some(old), Some(new))?;
                if result.is_delta_relevant() {
                    // Unknown verdicts stay in the set as Modified so the
                    // reviewer sees them with their diagnostics; dropping
                    // them would hide exactly the objects that need eyes.
                    let mut entry =
                        self.blank_entry(result.subject.clone(), DeltaCategory::Modified);
                    entry.version_changed = result.version_changed();
                    entry.content_changed = result.content_changed();
                    entry.diagnostics = result.diagnostics;
                    Some(entry)
                } else {
                    // Vendor did not touch it: out of the working set,
                    // regardless of what the customer did.
                    None
                }
            }
            (None, None) => None, // unreachable: uuid came from the union
        };
        Ok(entry)
    }

    /// Step 2: delta set vs B. Runs only on objects that survived Step 1.
    fn customer_overlay(
        &self,
        delta: Vec<DeltaEntry>,
        base: &dyn SnapshotSource,
        customer: &dyn SnapshotSource,
    ) -> Result<Vec<DeltaEntry>> {
        delta
            .into_par_iter()
            .map(|mut entry| {
                let uuid = &entry.subject.uuid;
                let in_customer = customer.get(uuid);
                entry.exists_in_customer = in_customer.is_some();

                // The customer verdict needs a base snapshot to compare
                // against; vendor-new objects have none, and their
                // classification ignores the customer side anyway.
                if let (Some(b), Some(a)) = (in_customer, base.get(uuid)) {
                    let result = self.comparator.compare(Some(a), Some(b))?;
                    entry.customer_modified = result.status != ComparisonStatus::NotChanged;
                    entry.customer_change_type = Some(if entry.customer_modified {
                        CustomerChangeType::Modified
                    } else {
                        CustomerChangeType::Unmodified
                    });
                    entry.diagnostics.extend(
                        result
                            .diagnostics
                            .into_iter()
                            .map(|d| format!("customer: {d}")),
                    );
                }
                Ok(entry)
            })
            .collect()
    }

    fn blank_entry(&self, subject: ObjectRef, category: DeltaCategory) -> DeltaEntry {
        DeltaEntry {
            subject,
            category,
            version_changed: false,
            content_changed: false,
            exists_in_customer: false,
            customer_modified: false,
            customer_change_type: None,
            display_order: 0,
            diagnostics: vec![],
        }
    }
}
