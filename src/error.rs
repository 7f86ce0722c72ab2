use thiserror::Error;

use crate::validation::ValidationIssue;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Maximum number of validation errors listed in a failure message.
pub const MAX_LISTED_ERRORS: usize = 5;

/// Error type returned by ingestion functions.
///
/// Problems with a single row or item never surface here; converters drop the offending item and
/// record it as a [`crate::types::SkippedItem`] instead.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON syntax or serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input bytes are not valid UTF-8 text.
    #[error("input is not valid utf-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Tabular input without a header row and at least one data row.
    #[error("empty input: {message}")]
    EmptyInput { message: String },

    /// None of the timestamp rules accepted the value.
    #[error("invalid timestamp format: '{raw}'")]
    InvalidTimestamp { raw: String },

    /// No timestamp column could be found in the header.
    #[error(
        "no timestamp field found; expected one of {candidates:?}, headers={headers:?}"
    )]
    NoTimestampField {
        candidates: Vec<String>,
        headers: Vec<String>,
    },

    /// Input is neither JSON nor recognizably CSV.
    #[error(
        "unrecognized format: not valid JSON ({json_error}); CSV was not attempted (no .csv extension and no comma in input)"
    )]
    UnrecognizedFormat { json_error: String },

    /// Pre-flight size check rejected the file before it was read.
    #[error("file size {:.2}MB exceeds limit of {:.0}MB", mebibytes(.size), mebibytes(.limit))]
    FileTooLarge { size: u64, limit: u64 },

    /// Conversion succeeded but the dataset did not pass validation.
    #[error("{}", failure_message(.errors))]
    Validation { errors: Vec<ValidationIssue> },
}

pub(crate) fn mebibytes(bytes: &u64) -> f64 {
    *bytes as f64 / (1024.0 * 1024.0)
}

/// Renders the user-facing validation failure text: a count, the first few errors, and how many
/// more were left out.
pub(crate) fn failure_message(errors: &[ValidationIssue]) -> String {
    let mut out = format!("validation failed with {} error(s):", errors.len());
    for issue in errors.iter().take(MAX_LISTED_ERRORS) {
        out.push('\n');
        out.push_str(&issue.to_string());
    }
    if errors.len() > MAX_LISTED_ERRORS {
        out.push_str(&format!("\n...and {} more", errors.len() - MAX_LISTED_ERRORS));
    }
    out
}
