use thiserror::Error;

/// Library error taxonomy.
///
/// Data-quality problems (unparseable objects, missing version metadata) are
/// **not** errors — they degrade into `ComparisonStatus::Unknown` with
/// diagnostics so one bad object never aborts a whole package comparison.
/// The variants here are contract violations or configuration mistakes that
/// indicate a caller bug and must not be swallowed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MergeError {
    /// `compare(None, None)` — at least one snapshot is required.
    #[error("comparison requires at least one snapshot")]
    EmptyComparison,

    /// A delta category string from outside the crate (e.g. a persisted
    /// `Change` row) did not match NEW / MODIFIED / DEPRECATED.
    #[error("invalid delta category: {0:?}")]
    InvalidDeltaCategory(String),

    /// A classification string from outside the crate did not match
    /// NEW / NO_CONFLICT / CONFLICT / DELETED.
    #[error("invalid classification: {0:?}")]
    InvalidClassification(String),

    /// A configured strip rule could not be compiled into a pattern.
    #[error("invalid strip rule {rule:?}")]
    InvalidStripRule {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// The XML envelope could not be parsed at all. Callers of the history
    /// extractor use this to tell "extraction failed" apart from "history
    /// present but empty".
    #[error("malformed XML: {0}")]
    MalformedXml(String),
}

pub type Result<T> = std::result::Result<T, MergeError>;
