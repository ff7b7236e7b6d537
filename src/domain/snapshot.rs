use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::ports::{IdResolver, SnapshotSource};
use crate::domain::value_objects::{ObjectTypeName, ObjectUuid, VersionUuid};

/// Lightweight reference to an object, carried by comparison results and
/// `Change` records so consumers can render them without the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    pub uuid: ObjectUuid,
    pub name: String,
    pub object_type: ObjectTypeName,
}

/// One version of one object as it appears inside a single package.
///
/// Immutable once extracted. Three snapshots of the same logical object (by
/// `uuid`) may exist simultaneously — one per package (base, customer,
/// vendor). `raw_xml` is the source of truth and is never discarded;
/// normalized content and the diff hash are derived on demand.
#[derive(Debug, Clone)]
pub struct ObjectSnapshot {
    pub uuid: ObjectUuid,
    pub name: String,
    pub object_type: ObjectTypeName,
    /// Identifier of this specific version. `None` when the export omitted
    /// version metadata — the comparator degrades to `Unknown` in that case.
    pub version_uuid: Option<VersionUuid>,
    /// The complete, unmodified serialized object.
    pub raw_xml: String,
}

impl ObjectSnapshot {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            uuid: self.uuid.clone(),
            name: self.name.clone(),
            object_type: self.object_type.clone(),
        }
    }

    /// Usable version metadata: an empty version element counts as absent.
    /// The comparator degrades to `Unknown` when either side returns `None`.
    pub fn version(&self) -> Option<&VersionUuid> {
        self.version_uuid.as_ref().filter(|v| !v.is_empty())
    }
}

/// One package's snapshots indexed by object uuid.
///
/// Backed by a `BTreeMap` so iteration is always ascending by uuid — the
/// delta scan relies on that for deterministic `display_order`.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex(BTreeMap<String, ObjectSnapshot>);

impl PackageIndex {
    pub fn new(snapshots: Vec<ObjectSnapshot>) -> Self {
        Self(
            snapshots
                .into_iter()
                .map(|s| (s.uuid.0.clone(), s))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl SnapshotSource for PackageIndex {
    fn get(&self, uuid: &ObjectUuid) -> Option<&ObjectSnapshot> {
        self.0.get(&uuid.0)
    }

    fn uuids(&self) -> BTreeSet<ObjectUuid> {
        self.0.keys().map(|k| ObjectUuid(k.clone())).collect()
    }
}

/// In-memory implementation of [`IdResolver`].
///
/// Production embedders back this port with their `object_lookup` table;
/// tests and standalone runs use this map directly.
#[derive(Debug, Clone, Default)]
pub struct MapIdResolver(BTreeMap<String, i64>);

impl MapIdResolver {
    pub fn new(ids: BTreeMap<String, i64>) -> Self {
        Self(ids)
    }
}

impl IdResolver for MapIdResolver {
    fn resolve(&self, uuid: &ObjectUuid) -> Option<i64> {
        self.0.get(&uuid.0).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(uuid: &str) -> ObjectSnapshot {
        ObjectSnapshot {
            uuid: ObjectUuid(uuid.to_string()),
            name: format!("obj-{uuid}"),
            object_type: ObjectTypeName("interface".to_string()),
            version_uuid: Some(VersionUuid("v1".to_string())),
            raw_xml: "<interface/>".to_string(),
        }
    }

    #[test]
    fn index_is_keyed_by_uuid() {
        let idx = PackageIndex::new(vec![snap("b"), snap("a")]);
        assert_eq!(idx.len(), 2);
        assert!(idx.get(&ObjectUuid("a".into())).is_some());
        assert!(idx.get(&ObjectUuid("missing".into())).is_none());
    }

    #[test]
    fn uuids_iterate_ascending() {
        let idx = PackageIndex::new(vec![snap("c"), snap("a"), snap("b")]);
        let uuids: Vec<String> = idx.uuids().into_iter().map(|u| u.0).collect();
        assert_eq!(uuids, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_version_uuid_counts_as_missing() {
        let mut s = snap("a");
        s.version_uuid = Some(VersionUuid("  ".to_string()));
        assert_eq!(s.version(), None);
        s.version_uuid = None;
        assert_eq!(s.version(), None);
        s.version_uuid = Some(VersionUuid("v2".to_string()));
        assert_eq!(s.version(), Some(&VersionUuid("v2".to_string())));
    }

    #[test]
    fn map_resolver_resolves_known_uuids() {
        let resolver = MapIdResolver::new([("a".to_string(), 7i64)].into());
        assert_eq!(resolver.resolve(&ObjectUuid("a".into())), Some(7));
        assert_eq!(resolver.resolve(&ObjectUuid("b".into())), None);
    }
}
