use sha2::{Digest, Sha512};

use crate::domain::normalize::ContentNormalizer;
use crate::domain::value_objects::DiffHash;

/// Oversized payloads are not hashed at all. This is a deliberate
/// performance guard, not an error: the comparator falls back to
/// version-history evidence for such objects.
pub const MAX_HASHABLE_BYTES: usize = 500_000;

/// Produces the content fingerprint used to tell functional changes apart
/// from version-metadata churn.
///
/// Algorithm:
/// 1. Bail out with `None` when `raw_xml` exceeds the byte cutoff.
/// 2. Normalize (strip version uuid, history, namespace declarations).
/// 3. SHA-512 over the UTF-8 normalized content, lowercase hex.
///
/// Pure function of `raw_xml` and the strip rules: byte-identical inputs
/// always hash identically, and inputs that differ only in version metadata
/// hash identically because step 2 removes it.
pub struct DiffHashGenerator {
    normalizer: ContentNormalizer,
    max_bytes: usize,
}

impl DiffHashGenerator {
    pub fn new(normalizer: ContentNormalizer) -> Self {
        Self {
            normalizer,
            max_bytes: MAX_HASHABLE_BYTES,
        }
    }

    pub fn with_max_bytes(normalizer: ContentNormalizer, max_bytes: usize) -> Self {
        Self {
            normalizer,
            max_bytes,
        }
    }

    pub fn generate(&self, raw_xml: &str) -> Option<DiffHash> {
        if raw_xml.len() > self.max_bytes {
            return None;
        }
        let normalized = self.normalizer.normalize(raw_xml);
        let digest = Sha512::digest(normalized.as_bytes());
        Some(DiffHash(format!("{digest:x}")))
    }
}
