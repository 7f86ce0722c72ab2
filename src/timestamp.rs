//! Timestamp normalization into epoch milliseconds.
//!
//! Rules, tried in order:
//!
//! 1. A number in `1000..=9999` (integral) is a calendar year: Jan 1 00:00:00 UTC of that year.
//! 2. Any other finite number is already epoch milliseconds and passes through (truncated).
//! 3. A string is parsed as a date (ISO-8601/RFC 3339, RFC 2822, `YYYY-MM-DD`, `MM/DD/YYYY`,
//!    `DD.MM.YYYY`, `Month D, YYYY`, ...). Values without an offset are read as UTC.
//! 4. A string whose leading integer is in `1000..=9999` is a year, as in rule 1.
//!
//! A 4-digit numeric value is therefore always a year, never a small millisecond offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{IngestionError, IngestionResult};

const MIN_YEAR: i64 = 1000;
const MAX_YEAR: i64 = 9999;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// A timestamp as it appears in source data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTimestamp<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
}

impl From<i64> for RawTimestamp<'_> {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for RawTimestamp<'_> {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for RawTimestamp<'_> {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl<'a> From<&'a str> for RawTimestamp<'a> {
    fn from(v: &'a str) -> Self {
        Self::Text(v)
    }
}

/// Normalize a timestamp to epoch milliseconds.
///
/// ```rust
/// use geo_time_ingest::timestamp::normalize;
///
/// let y1900 = -2_208_988_800_000;
/// assert_eq!(normalize(1900).unwrap(), y1900);
/// assert_eq!(normalize("1900").unwrap(), y1900);
/// assert_eq!(normalize(1_600_000_000_000_i64).unwrap(), 1_600_000_000_000);
/// ```
pub fn normalize<'a>(value: impl Into<RawTimestamp<'a>>) -> IngestionResult<i64> {
    match value.into() {
        RawTimestamp::Integer(n) => Ok(year_to_epoch_ms(n).unwrap_or(n)),
        RawTimestamp::Float(n) => normalize_float(n),
        RawTimestamp::Text(s) => normalize_text(s),
    }
}

/// Normalize a JSON scalar (number or string). Other JSON types are rejected.
pub fn normalize_json(value: &Value) -> IngestionResult<i64> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => normalize(i),
            None => normalize(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => normalize(s.as_str()),
        other => Err(invalid(&other.to_string())),
    }
}

/// Epoch milliseconds of Jan 1 00:00:00 UTC for a year in `1000..=9999`.
pub fn year_to_epoch_ms(year: i64) -> Option<i64> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

fn normalize_float(n: f64) -> IngestionResult<i64> {
    if !n.is_finite() {
        return Err(invalid(&n.to_string()));
    }
    if n.fract() == 0.0 {
        if let Some(ms) = year_to_epoch_ms(n as i64) {
            return Ok(ms);
        }
    }
    Ok(n.trunc() as i64)
}

fn normalize_text(raw: &str) -> IngestionResult<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(invalid(raw));
    }
    if let Some(ms) = parse_date_string(s) {
        return Ok(ms);
    }
    leading_integer(s)
        .and_then(year_to_epoch_ms)
        .ok_or_else(|| invalid(raw))
}

fn parse_date_string(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    // Year-month only, e.g. "1950-06".
    if s.len() == 7 && s.as_bytes()[4] == b'-' {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Leading optionally-signed decimal integer, ignoring any trailing text ("1850s" -> 1850).
fn leading_integer(s: &str) -> Option<i64> {
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s[..end].parse().ok()
}

fn invalid(raw: &str) -> IngestionError {
    IngestionError::InvalidTimestamp {
        raw: raw.to_string(),
    }
}
