use serde::{Deserialize, Serialize};

/// Newtype for the stable object identity shared by every version of an
/// object across all packages. Matching between packages happens on this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ObjectUuid(pub String);

impl ObjectUuid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Newtype for the identifier of one specific version of an object.
/// Reissued by the platform whenever the object's content changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionUuid(pub String);

impl VersionUuid {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Version metadata can arrive as an empty element; treat that the same
    /// as absent.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for VersionUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// SHA-512 hex fingerprint of an object's normalized XML content.
///
/// Computed by `DiffHashGenerator::generate`. Two snapshots that differ only
/// in version metadata hash identically because normalization strips that
/// metadata first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffHash(pub String);

impl DiffHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiffHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Newtype for the vendor's object-type tag ("interface", "processModel", …).
/// Opaque to the engine; only used for report bucketing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ObjectTypeName(pub String);

impl std::fmt::Display for ObjectTypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Which XML constructs the normalizer removes before hashing.
///
/// The exact set of "non-functional" constructs depends on the export
/// dialect, so it is configuration rather than hard-coded: `elements` names
/// elements whose whole subtree is dropped, `attribute_prefixes` names
/// attribute-name prefixes (e.g. `xmlns`) whose declarations are dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct StripRules {
    #[serde(default = "default_strip_elements")]
    pub elements: Vec<String>,
    #[serde(default = "default_strip_attribute_prefixes")]
    pub attribute_prefixes: Vec<String>,
}

fn default_strip_elements() -> Vec<String> {
    vec!["versionUuid".to_string(), "history".to_string()]
}

fn default_strip_attribute_prefixes() -> Vec<String> {
    vec!["xmlns".to_string()]
}

impl Default for StripRules {
    fn default() -> Self {
        Self {
            elements: default_strip_elements(),
            attribute_prefixes: default_strip_attribute_prefixes(),
        }
    }
}
