//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest`] or [`ingest_from_path`] (from [`unified`]) which:
//!
//! - reject oversized inputs before parsing ([`preflight`])
//! - sniff the format (JSON first, then CSV) or use the one forced in [`IngestionOptions`]
//! - convert into a GeoJSON FeatureCollection and validate it
//! - optionally report success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]
//! - [`detect`]

pub mod catalog;
pub mod csv;
pub mod detect;
pub mod fields;
pub mod json;
pub mod observability;
pub mod unified;

pub use catalog::{discover_datasets, ingest_dir};
pub use detect::{auto_detect, auto_detect_with, detect_format, DetectedFormat};
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use unified::{
    ingest, ingest_from_path, preflight, Dataset, FileWarning, IngestionOptions, IngestionRequest,
    ACCEPTED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE, LARGE_FILE_WARNING_BYTES,
};
