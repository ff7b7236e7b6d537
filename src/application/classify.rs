use crate::application::delta::DeltaEntry;
use crate::domain::change::{Change, Classification, DeltaCategory, MergeChangeset};
use crate::domain::ports::IdResolver;

/// The seven classification rules, as a total decision table over
/// `(vendor delta category, exists in customer, customer modified)`.
///
/// | category   | in customer | modified | classification |
/// |------------|-------------|----------|----------------|
/// | NEW        | —           | —        | NEW            |
/// | MODIFIED   | false       | —        | DELETED        |
/// | MODIFIED   | true        | true     | CONFLICT       |
/// | MODIFIED   | true        | false    | NO_CONFLICT    |
/// | DEPRECATED | false       | —        | NO_CONFLICT    |
/// | DEPRECATED | true        | true     | CONFLICT       |
/// | DEPRECATED | true        | false    | NO_CONFLICT    |
///
/// The enum input makes an out-of-range category unrepresentable here;
/// strings from outside the crate go through `DeltaCategory::from_str`,
/// which rejects unknown values with `MergeError::InvalidDeltaCategory`.
pub fn classify(
    category: DeltaCategory,
    exists_in_customer: bool,
    customer_modified: bool,
) -> Classification {
    match (category, exists_in_customer, customer_modified) {
        (DeltaCategory::New, _, _) => Classification::New,
        (DeltaCategory::Modified, false, _) => Classification::Deleted,
        (DeltaCategory::Modified, true, true) => Classification::Conflict,
        (DeltaCategory::Modified, true, false) => Classification::NoConflict,
        (DeltaCategory::Deprecated, false, _) => Classification::NoConflict,
        (DeltaCategory::Deprecated, true, true) => Classification::Conflict,
        (DeltaCategory::Deprecated, true, false) => Classification::NoConflict,
    }
}

/// Materialize the delta set into persistable `Change` records.
///
/// Internal ids are resolved through the caller's lookup when available;
/// unresolved uuids keep `object_id = None` and the caller decides whether
/// that is acceptable at persistence time.
pub fn build_changeset(
    delta: Vec<DeltaEntry>,
    resolver: Option<&dyn IdResolver>,
) -> MergeChangeset {
    let changes: Vec<Change> = delta
        .into_iter()
        .map(|entry| {
            let classification =
                classify(entry.category, entry.exists_in_customer, entry.customer_modified);
            Change {
                object_id: resolver.and_then(|r| r.resolve(&entry.subject.uuid)),
                subject: entry.subject,
                classification,
                vendor_change_type: entry.category,
                customer_change_type: entry.customer_change_type,
                exists_in_customer: entry.exists_in_customer,
                version_changed: entry.version_changed,
                content_changed: entry.content_changed,
                display_order: entry.display_order,
                diagnostics: entry.diagnostics,
            }
        })
        .collect();

    MergeChangeset::new(changes)
}
