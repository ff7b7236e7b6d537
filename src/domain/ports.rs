use std::collections::BTreeSet;

use crate::domain::comparison::ComparisonResult;
use crate::domain::snapshot::ObjectSnapshot;
use crate::domain::value_objects::ObjectUuid;
use crate::error::Result;

/// Port: uuid-keyed access to one package's snapshots
/// (implemented by `PackageIndex`).
pub trait SnapshotSource: Send + Sync {
    fn get(&self, uuid: &ObjectUuid) -> Option<&ObjectSnapshot>;

    /// All object uuids in the package, in ascending order.
    fn uuids(&self) -> BTreeSet<ObjectUuid>;
}

/// Port: pairwise object comparison
/// (implemented by `DualLayerComparator`, wrapped by `MonitoringComparator`).
pub trait Comparator: Send + Sync {
    /// `Err` only for contract violations (both sides absent). Data-quality
    /// problems degrade into the result's status and diagnostics instead.
    fn compare(
        &self,
        old: Option<&ObjectSnapshot>,
        new: Option<&ObjectSnapshot>,
    ) -> Result<ComparisonResult>;
}

/// Port: uuid → internal id resolution, backed by the caller's
/// `object_lookup` storage (implemented in-memory by `MapIdResolver`).
pub trait IdResolver: Send + Sync {
    fn resolve(&self, uuid: &ObjectUuid) -> Option<i64>;
}
