//! Input format detection and auto-conversion.
//!
//! Detection is a fallible probe that yields a tag:
//!
//! - [`DetectedFormat::Json`] when the text parses as JSON (the parsed value is kept),
//! - otherwise [`DetectedFormat::Csv`] when the filename ends in `.csv` or the text contains a
//!   comma,
//! - otherwise [`DetectedFormat::Unrecognized`], carrying the JSON parse error.

use std::path::Path;

use serde_json::Value;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Conversion, SourceFormat};

use super::{csv, json};

/// Outcome of sniffing an input.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectedFormat {
    /// Text parsed as JSON.
    Json(Value),
    /// Not JSON, but plausibly CSV.
    Csv,
    /// Neither; `json_error` is the JSON parser's message.
    Unrecognized { json_error: String },
}

impl DetectedFormat {
    /// The source format, if one was recognized.
    pub fn source_format(&self) -> Option<SourceFormat> {
        match self {
            Self::Json(_) => Some(SourceFormat::Json),
            Self::Csv => Some(SourceFormat::Csv),
            Self::Unrecognized { .. } => None,
        }
    }
}

/// Sniff `text` (with `filename` as a hint) without converting it.
pub fn detect_format(text: &str, filename: &str) -> DetectedFormat {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => DetectedFormat::Json(value),
        Err(e) => {
            if has_csv_extension(filename) || text.contains(',') {
                DetectedFormat::Csv
            } else {
                DetectedFormat::Unrecognized {
                    json_error: e.to_string(),
                }
            }
        }
    }
}

/// Detect the format of `text` and convert it with the default timestamp candidates.
pub fn auto_detect(text: &str, filename: &str) -> IngestionResult<Conversion> {
    auto_detect_with(text, filename, None)
}

/// Detect the format of `text` and convert it.
///
/// JSON goes through [`json::from_json_records`] (a FeatureCollection passes through
/// unchanged); CSV goes through [`csv::parse_rows`] and [`csv::from_rows`]. CSV-level failures
/// (empty input, no timestamp column) abort the conversion.
pub fn auto_detect_with(
    text: &str,
    filename: &str,
    time_field: Option<&str>,
) -> IngestionResult<Conversion> {
    let detected = detect_format(text, filename);
    tracing::debug!(filename, format = ?detected.source_format(), "detected input format");

    match detected {
        DetectedFormat::Json(value) => Ok(json::from_json_records(value, time_field)),
        DetectedFormat::Csv => csv::csv_to_features(text, time_field),
        DetectedFormat::Unrecognized { json_error } => {
            Err(IngestionError::UnrecognizedFormat { json_error })
        }
    }
}

fn has_csv_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .and_then(SourceFormat::from_extension)
        == Some(SourceFormat::Csv)
}
