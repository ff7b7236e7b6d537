use anyhow::Result;
use std::sync::Arc;

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

// ─── Log level ────────────────────────────────────────────────────────────────

/// Controls the verbosity of packmerge's internal tracing output.
///
/// Pass to [`init_tracing`] before calling any entry point.
///
/// | Variant | `tracing` level | When to use                            |
/// |---------|-----------------|----------------------------------------|
/// | `Error` | `error`         | CI scripting                           |
/// | `Info`  | `info`          | Default — shows per-phase object counts|
/// | `Debug` | `debug`         | Shows per-object comparison timings    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

/// Initialise the global `tracing` subscriber for packmerge.
///
/// Convenience wrapper around `tracing_subscriber`; respects `RUST_LOG` when
/// set, falling back to `level` otherwise. Call **once** at startup.
/// Embedders who manage their own subscriber should skip this and configure
/// tracing themselves.
///
/// Only available when the `telemetry` feature is enabled (pulls in
/// `tracing-subscriber`).
#[cfg(feature = "telemetry")]
pub fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;

    let default_filter = match level {
        LogLevel::Error => "packmerge=error",
        LogLevel::Info => "packmerge=info",
        LogLevel::Debug => "packmerge=debug",
    };

    tracing_subscriber::fmt()
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

// ─── Public API Facade ───

pub use application::aggregate::{summarize_results, ReportAggregator};
pub use application::classify::{build_changeset, classify};
pub use application::comparator::DualLayerComparator;
pub use application::delta::{DeltaEntry, PackageDeltaService};
pub use application::monitoring::{MonitoringComparator, PerfReport};
pub use domain::change::{
    Change, Classification, CustomerChangeType, DeltaCategory, MergeChangeset, Summary,
};
pub use domain::comparison::{
    ComparisonResult, ComparisonStatus, ContentEvidence, VersionEvidence,
};
pub use domain::diff_hash::{DiffHashGenerator, MAX_HASHABLE_BYTES};
pub use domain::history::{extract_history, VersionEntry, VersionHistory};
pub use domain::normalize::ContentNormalizer;
pub use domain::ports::{Comparator, IdResolver, SnapshotSource};
pub use domain::report::{ImpactLevel, ImpactThresholds, MergeReport, StatusBreakdown};
pub use domain::snapshot::{MapIdResolver, ObjectRef, ObjectSnapshot, PackageIndex};
pub use domain::value_objects::{
    DiffHash, ObjectTypeName, ObjectUuid, StripRules, VersionUuid,
};
pub use error::MergeError;
pub use infrastructure::config::{AppConfig, HashingConfig};

// ─── Public entry points ───

/// One-shot pairwise comparison with the configured strip rules and cutoff.
///
/// Use [`merge`] for the full three-package pipeline.
pub fn compare(
    cfg: &AppConfig,
    old: Option<&ObjectSnapshot>,
    new: Option<&ObjectSnapshot>,
) -> Result<ComparisonResult> {
    let comparator = build_comparator(cfg)?;
    Ok(comparator.compare(old, new)?)
}

/// Full three-way pipeline: vendor delta, customer overlay, classification,
/// aggregation.
///
/// `base` is the originally shipped package (A), `customer` the customized
/// deployment (B), `vendor` the new release (C). Returns the persistable
/// changeset plus its rolled-up report. Persisting the changeset — in one
/// transaction per merge session — is the caller's responsibility.
pub fn merge(
    cfg: &AppConfig,
    base: Vec<ObjectSnapshot>,
    customer: Vec<ObjectSnapshot>,
    vendor: Vec<ObjectSnapshot>,
) -> Result<(MergeChangeset, MergeReport)> {
    let (changeset, report, _) = run_merge(cfg, base, customer, vendor, None)?;
    Ok((changeset, report))
}

/// [`merge`] with per-object comparison timings.
pub fn merge_with_timing(
    cfg: &AppConfig,
    base: Vec<ObjectSnapshot>,
    customer: Vec<ObjectSnapshot>,
    vendor: Vec<ObjectSnapshot>,
) -> Result<(MergeChangeset, MergeReport, PerfReport)> {
    run_merge(cfg, base, customer, vendor, None)
}

/// [`merge`] with internal ids resolved through the caller's lookup.
pub fn merge_with_resolver(
    cfg: &AppConfig,
    base: Vec<ObjectSnapshot>,
    customer: Vec<ObjectSnapshot>,
    vendor: Vec<ObjectSnapshot>,
    resolver: &dyn IdResolver,
) -> Result<(MergeChangeset, MergeReport)> {
    let (changeset, report, _) = run_merge(cfg, base, customer, vendor, Some(resolver))?;
    Ok((changeset, report))
}

// ─── Private helpers ──────────────────────────────────────────────────────────

fn run_merge(
    cfg: &AppConfig,
    base: Vec<ObjectSnapshot>,
    customer: Vec<ObjectSnapshot>,
    vendor: Vec<ObjectSnapshot>,
    resolver: Option<&dyn IdResolver>,
) -> Result<(MergeChangeset, MergeReport, PerfReport)> {
    let report = PerfReport::new();
    let comparator = Arc::new(MonitoringComparator::new(
        Arc::new(build_comparator(cfg)?),
        Arc::clone(&report),
    ));

    let base = PackageIndex::new(base);
    let customer = PackageIndex::new(customer);
    let vendor = PackageIndex::new(vendor);

    let service = PackageDeltaService::new(comparator);
    let delta = service.compare_packages(&base, &customer, &vendor)?;

    let changeset = build_changeset(delta, resolver);
    let merge_report = ReportAggregator::new(cfg.impact).aggregate(&changeset);

    let perf = report.lock().map(|r| r.clone()).unwrap_or_default();
    Ok((changeset, merge_report, perf))
}

/// Wire the comparator from configuration: strip rules feed the normalizer,
/// the normalizer feeds the hash generator, the hash generator feeds the
/// comparator. Plain constructor injection, no registry.
fn build_comparator(cfg: &AppConfig) -> Result<DualLayerComparator> {
    let normalizer = ContentNormalizer::new(&cfg.normalizer)?;
    let hash_gen = DiffHashGenerator::with_max_bytes(normalizer, cfg.hashing.max_bytes);
    Ok(DualLayerComparator::new(hash_gen))
}
