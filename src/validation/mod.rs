//! GeoJSON validation.
//!
//! [`validate`] inspects a FeatureCollection-shaped value and always returns a complete
//! [`ValidationReport`]: structural problems become errors, recoverable concerns become
//! warnings, and statistics are computed over whatever could be read. It never fails and never
//! modifies its input.
//!
//! Rules:
//!
//! - The top level must be an object with `type: "FeatureCollection"` and a `features` array;
//!   otherwise the report holds a single error and empty stats. Zero features is valid, with a
//!   warning.
//! - Longitudes must be numbers in `[-180, 180]`, latitudes numbers in `[-90, 90]`. A pair with
//!   `|lon| <= 90` and `|lat| > 90` also gets a swapped-axis warning.
//! - Points need two values, LineStrings two points, Polygons one ring; each ring needs four
//!   points and must be closed. Other geometry kinds are a warning.
//! - A missing `properties` object is a warning. A missing or unparseable
//!   `properties.timestamp` is a per-feature warning; when no feature has one, the collection
//!   gets one error.
//! - Identical timestamps across the collection are a warning.

mod geometry;
mod report;

use serde_json::Value;

use crate::timestamp;

pub use report::{
    IssueKind, IssueLocation, TimeSpan, ValidationIssue, ValidationReport, ValidationStats,
};

/// Validate a GeoJSON FeatureCollection value.
///
/// ```rust
/// use geo_time_ingest::validation::validate;
/// use serde_json::json;
///
/// let doc = json!({"type": "FeatureCollection", "features": []});
/// let report = validate(&doc);
/// assert!(report.is_valid());
/// assert_eq!(report.warnings.len(), 1);
/// ```
pub fn validate(doc: &Value) -> ValidationReport {
    let mut out = Findings::default();
    let mut stats = ValidationStats::default();
    let top = IssueLocation::collection();

    let Some(obj) = doc.as_object() else {
        out.error(IssueKind::NotAnObject, top, "data is not a valid object");
        return out.into_report(stats);
    };

    let kind = obj.get("type").and_then(Value::as_str);
    if kind != Some("FeatureCollection") {
        let got = obj.get("type").map_or_else(|| "undefined".to_string(), display_value);
        out.error(
            IssueKind::NotFeatureCollection,
            top,
            format!("expected type 'FeatureCollection', got '{got}'"),
        );
        return out.into_report(stats);
    }

    let Some(features) = obj.get("features").and_then(Value::as_array) else {
        out.error(
            IssueKind::MissingFeatures,
            top,
            "FeatureCollection must have a \"features\" array",
        );
        return out.into_report(stats);
    };

    if features.is_empty() {
        out.warning(
            IssueKind::EmptyCollection,
            top,
            "FeatureCollection is empty (no features)",
        );
        return out.into_report(stats);
    }

    stats.feature_count = features.len();
    for (index, feature) in features.iter().enumerate() {
        check_feature(feature, index, &mut stats, &mut out);
    }

    if stats.missing_timestamps == stats.feature_count {
        out.error(
            IssueKind::NoTimestamps,
            top,
            "no features have valid timestamps. Add a \"timestamp\" property to each feature.",
        );
    }

    if stats.time_span().is_some_and(|s| s.milliseconds == 0) {
        out.warning(
            IssueKind::ZeroTimeSpan,
            top,
            "all features have the same timestamp. Timeline will not be very useful.",
        );
    }

    out.into_report(stats)
}

fn check_feature(feature: &Value, index: usize, stats: &mut ValidationStats, out: &mut Findings) {
    let loc = IssueLocation::feature(index);
    let Some(obj) = feature.as_object() else {
        out.error(IssueKind::FeatureNotAnObject, loc, "not a valid object");
        return;
    };

    match obj.get("type").and_then(Value::as_str) {
        Some("Feature") => {}
        other => out.error(
            IssueKind::FeatureType,
            loc,
            format!("expected type 'Feature', got '{}'", other.unwrap_or("undefined")),
        ),
    }

    let geometry = obj.get("geometry");
    geometry::check_geometry(geometry, index, out);
    match geometry.and_then(|g| g.get("type")).and_then(Value::as_str) {
        Some("Point") => stats.point_count += 1,
        Some("LineString") => stats.line_count += 1,
        Some("Polygon") => stats.polygon_count += 1,
        _ => {}
    }

    let properties = obj.get("properties").and_then(Value::as_object);
    if properties.is_none() {
        out.warning(IssueKind::MissingProperties, loc, "missing 'properties' object");
    }

    match properties.and_then(|p| p.get("timestamp")) {
        None | Some(Value::Null) => {
            stats.missing_timestamps += 1;
            out.warning(
                IssueKind::MissingTimestamp,
                loc,
                "missing 'timestamp' property. Feature will not be displayed on timeline.",
            );
        }
        Some(raw) => match feature_timestamp(raw) {
            Some(ts) => stats.record_timestamp(ts),
            None => {
                stats.missing_timestamps += 1;
                out.warning(
                    IssueKind::InvalidTimestamp,
                    loc,
                    format!(
                        "invalid timestamp value: {}. Feature will not be displayed on timeline.",
                        display_value(raw)
                    ),
                );
            }
        },
    }
}

/// Numbers are epoch milliseconds as-is; strings go through the normalizer.
fn feature_timestamp(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => timestamp::normalize(s.as_str()).ok(),
        _ => None,
    }
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Errors and warnings collected during one pass.
#[derive(Debug, Default)]
pub(crate) struct Findings {
    pub(crate) errors: Vec<ValidationIssue>,
    pub(crate) warnings: Vec<ValidationIssue>,
}

impl Findings {
    pub(crate) fn error(
        &mut self,
        kind: IssueKind,
        location: IssueLocation,
        message: impl Into<String>,
    ) {
        self.errors.push(ValidationIssue {
            kind,
            location,
            message: message.into(),
        });
    }

    pub(crate) fn warning(
        &mut self,
        kind: IssueKind,
        location: IssueLocation,
        message: impl Into<String>,
    ) {
        self.warnings.push(ValidationIssue {
            kind,
            location,
            message: message.into(),
        });
    }

    fn into_report(self, stats: ValidationStats) -> ValidationReport {
        ValidationReport {
            errors: self.errors,
            warnings: self.warnings,
            stats,
        }
    }
}
