//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest`] (bytes already in hand) or [`ingest_from_path`], which
//! turn raw input into a validated [`Dataset`]:
//!
//! 1. [`preflight`] rejects oversized files before any bytes are parsed.
//! 2. The text is sniffed and converted ([`super::detect::auto_detect_with`]), unless
//!    [`IngestionOptions::format`] forces a format.
//! 3. The result is validated; a report with errors fails the whole ingestion.
//!
//! If an [`IngestionObserver`] is configured, success/failure/alerts are reported to it.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{mebibytes, IngestionError, IngestionResult};
use crate::types::{GeoDocument, SkippedItem, SourceFormat};
use crate::validation::{validate, ValidationReport};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, detect, json};

/// Hard upper bound on input size (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Inputs above this size (1 MiB) get a pre-flight warning.
pub const LARGE_FILE_WARNING_BYTES: u64 = 1024 * 1024;

/// Extensions accepted without a pre-flight warning.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["json", "geojson", "csv"];

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, the format is sniffed from the content (JSON first, then CSV).
    pub format: Option<SourceFormat>,
    /// Explicit timestamp field; `None` tries the standard candidates.
    pub time_field: Option<String>,
    /// Pre-flight size limit in bytes.
    pub max_file_size: u64,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("time_field", &self.time_field)
            .field("max_file_size", &self.max_file_size)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            time_field: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Non-fatal pre-flight findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileWarning {
    /// File is large enough to be slow to load.
    LargeFile { size: u64 },
    /// Extension is not one of [`ACCEPTED_EXTENSIONS`].
    UnexpectedExtension { filename: String },
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LargeFile { size } => write!(
                f,
                "large file ({:.2}MB) may take a while to load",
                mebibytes(size)
            ),
            Self::UnexpectedExtension { filename } => write!(
                f,
                "unexpected file extension for '{filename}'. Expected: .{}",
                ACCEPTED_EXTENSIONS.join(", .")
            ),
        }
    }
}

/// A converted and validated dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// FeatureCollection for the renderer.
    pub document: GeoDocument,
    /// Format the input was read as.
    pub format: SourceFormat,
    /// Validation report; always valid on a returned dataset, possibly with warnings.
    pub report: ValidationReport,
    /// Rows/items dropped during conversion.
    pub skipped: Vec<SkippedItem>,
    /// Pre-flight warnings.
    pub file_warnings: Vec<FileWarning>,
}

impl Dataset {
    /// Human-readable load summary (see [`ValidationReport::summary`]).
    pub fn summary(&self) -> String {
        self.report.summary()
    }
}

/// Check a file by name and size before reading it.
///
/// Fails with [`IngestionError::FileTooLarge`] above `max_file_size`; a large file or an
/// unexpected extension only produces warnings.
pub fn preflight(filename: &str, size: u64, max_file_size: u64) -> IngestionResult<Vec<FileWarning>> {
    if size > max_file_size {
        return Err(IngestionError::FileTooLarge {
            size,
            limit: max_file_size,
        });
    }

    let mut warnings = Vec::new();
    if size > LARGE_FILE_WARNING_BYTES {
        warnings.push(FileWarning::LargeFile { size });
    }
    let lower = filename.to_ascii_lowercase();
    if !ACCEPTED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
    {
        warnings.push(FileWarning::UnexpectedExtension {
            filename: filename.to_string(),
        });
    }
    Ok(warnings)
}

/// Ingest raw bytes named `filename`.
///
/// ```rust
/// use geo_time_ingest::ingestion::{ingest, IngestionOptions};
///
/// # fn main() -> Result<(), geo_time_ingest::IngestionError> {
/// let csv = "timestamp,latitude,longitude,name\n1900,10,20,A\n1950,30,40,B\n";
/// let ds = ingest(csv.as_bytes(), "cities.csv", &IngestionOptions::default())?;
/// assert_eq!(ds.document.feature_count(), 2);
/// println!("{}", ds.summary());
/// # Ok(())
/// # }
/// ```
pub fn ingest(bytes: &[u8], filename: &str, options: &IngestionOptions) -> IngestionResult<Dataset> {
    let mut ctx = IngestionContext {
        source: filename.to_string(),
        format: None,
    };
    let result = preflight(filename, bytes.len() as u64, options.max_file_size)
        .and_then(|warnings| ingest_checked(bytes, filename, warnings, options, &mut ctx));
    report_outcome(&ctx, &result, options);
    result
}

/// Ingest a file from disk. The size check runs on file metadata before the file is read.
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Dataset> {
    let path = path.as_ref();
    let filename = path.display().to_string();
    let mut ctx = IngestionContext {
        source: filename.clone(),
        format: None,
    };

    let result = fs::metadata(path)
        .map_err(IngestionError::from)
        .and_then(|meta| preflight(&filename, meta.len(), options.max_file_size))
        .and_then(|warnings| {
            let bytes = fs::read(path)?;
            ingest_checked(&bytes, &filename, warnings, options, &mut ctx)
        });
    report_outcome(&ctx, &result, options);
    result
}

fn ingest_checked(
    bytes: &[u8],
    filename: &str,
    file_warnings: Vec<FileWarning>,
    options: &IngestionOptions,
    ctx: &mut IngestionContext,
) -> IngestionResult<Dataset> {
    for w in &file_warnings {
        tracing::warn!(source = filename, warning = %w, "pre-flight warning");
    }

    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let time_field = options.time_field.as_deref();

    let conversion = match options.format {
        None => detect::auto_detect_with(text, filename, time_field)?,
        Some(SourceFormat::Json) => json::json_to_features(text, time_field)?,
        Some(SourceFormat::Csv) => csv::csv_to_features(text, time_field)?,
    };
    ctx.format = Some(conversion.format);

    let report = validate(conversion.document.as_geojson()?.as_ref());
    if !report.is_valid() {
        return Err(IngestionError::Validation {
            errors: report.errors,
        });
    }

    Ok(Dataset {
        document: conversion.document,
        format: conversion.format,
        report,
        skipped: conversion.skipped,
        file_warnings,
    })
}

fn report_outcome(ctx: &IngestionContext, result: &IngestionResult<Dataset>, options: &IngestionOptions) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(ds) => obs.on_success(
            ctx,
            IngestionStats {
                features: ds.document.feature_count(),
                warnings: ds.report.warnings.len() + ds.file_warnings.len(),
                skipped: ds.skipped.len(),
            },
        ),
        Err(e) => {
            let sev = IngestionSeverity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// One file plus the options to load it with.
///
/// [`ingest_dir`](super::ingest_dir) builds one per discovered dataset.
#[derive(Debug, Clone)]
pub struct IngestionRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl IngestionRequest {
    /// Execute the request by calling [`ingest_from_path`].
    pub fn run(&self) -> IngestionResult<Dataset> {
        ingest_from_path(&self.path, &self.options)
    }
}
