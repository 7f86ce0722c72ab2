//! Validation report types and the human-readable load summary.

use std::fmt;

use chrono::DateTime;

use crate::error::failure_message;

/// Number of warnings listed in a success summary.
const MAX_LISTED_WARNINGS: usize = 3;

/// What a validation issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Top-level value is not an object.
    NotAnObject,
    /// Top-level `type` is not `FeatureCollection`.
    NotFeatureCollection,
    /// Top-level `features` is not an array.
    MissingFeatures,
    /// Collection has zero features.
    EmptyCollection,
    /// A feature is not an object.
    FeatureNotAnObject,
    /// A feature's `type` is not `Feature`.
    FeatureType,
    /// Geometry absent or not an object.
    MissingGeometry,
    /// Geometry without a `type`.
    MissingGeometryType,
    /// Geometry without `coordinates`.
    MissingCoordinates,
    /// A coordinate entry is not an array of at least two values.
    MalformedCoordinate,
    /// Longitude is not a number.
    InvalidLongitude,
    /// Longitude outside `[-180, 180]`.
    LongitudeOutOfRange,
    /// Latitude is not a number.
    InvalidLatitude,
    /// Latitude outside `[-90, 90]`.
    LatitudeOutOfRange,
    /// Looks like `[lat, lon]` instead of `[lon, lat]`.
    SuspectedSwappedAxes,
    /// LineString with fewer than two points.
    TooFewPoints,
    /// Polygon without rings.
    NoRings,
    /// Polygon ring with fewer than four points.
    RingTooShort,
    /// Polygon ring whose first and last points differ.
    RingNotClosed,
    /// Geometry kind other than Point, LineString or Polygon.
    UnsupportedGeometry,
    /// Feature without a `properties` object.
    MissingProperties,
    /// Feature without a `timestamp` property.
    MissingTimestamp,
    /// Feature whose `timestamp` property cannot be normalized.
    InvalidTimestamp,
    /// No feature in the collection has a usable timestamp.
    NoTimestamps,
    /// Every timestamp is identical.
    ZeroTimeSpan,
}

/// Where an issue was found. All `None` means the collection as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IssueLocation {
    pub feature: Option<usize>,
    pub ring: Option<usize>,
    pub point: Option<usize>,
}

impl IssueLocation {
    pub fn collection() -> Self {
        Self::default()
    }

    pub fn feature(index: usize) -> Self {
        Self {
            feature: Some(index),
            ..Self::default()
        }
    }

    pub fn with_ring(self, ring: usize) -> Self {
        Self {
            ring: Some(ring),
            ..self
        }
    }

    pub fn with_point(self, point: usize) -> Self {
        Self {
            point: Some(point),
            ..self
        }
    }
}

impl fmt::Display for IssueLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [
            self.feature.map(|i| format!("Feature {i}")),
            self.ring.map(|i| format!("ring {i}")),
            self.point.map(|i| format!("point {i}")),
        ];
        let parts: Vec<String> = parts.into_iter().flatten().collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// One error or warning, with its location and a human-readable message.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub location: IssueLocation,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location == IssueLocation::collection() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.location, self.message)
        }
    }
}

/// Length of the covered time range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub milliseconds: i64,
    pub days: f64,
    /// `days / 365.25`.
    pub years: f64,
}

impl TimeSpan {
    pub fn from_millis(milliseconds: i64) -> Self {
        let days = milliseconds as f64 / 86_400_000.0;
        Self {
            milliseconds,
            days,
            years: days / 365.25,
        }
    }
}

/// Aggregate statistics over the structurally readable part of a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationStats {
    pub feature_count: usize,
    pub point_count: usize,
    pub line_count: usize,
    pub polygon_count: usize,
    /// Features whose timestamp was missing or unparseable.
    pub missing_timestamps: usize,
    /// Earliest timestamp (epoch ms).
    pub min_timestamp: Option<i64>,
    /// Latest timestamp (epoch ms).
    pub max_timestamp: Option<i64>,
}

impl ValidationStats {
    /// `max - min`, when at least one feature had a timestamp. Saturates at `i64::MAX`.
    pub fn time_span(&self) -> Option<TimeSpan> {
        match (self.min_timestamp, self.max_timestamp) {
            (Some(min), Some(max)) => Some(TimeSpan::from_millis(max.saturating_sub(min))),
            _ => None,
        }
    }

    pub(crate) fn record_timestamp(&mut self, ts: i64) {
        self.min_timestamp = Some(self.min_timestamp.map_or(ts, |m| m.min(ts)));
        self.max_timestamp = Some(self.max_timestamp.map_or(ts, |m| m.max(ts)));
    }
}

/// Full result of one validation pass. Never merged or mutated after it is returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub stats: ValidationStats,
}

impl ValidationReport {
    /// `true` exactly when there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors and warnings of one kind.
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationIssue> {
        self.errors
            .iter()
            .chain(&self.warnings)
            .filter(move |i| i.kind == kind)
    }

    /// Multi-line load summary for display.
    ///
    /// For a valid report: feature counts per kind, time span and date range, and the first
    /// few warnings. For an invalid report: the first five errors and how many were left out.
    pub fn summary(&self) -> String {
        if !self.is_valid() {
            return failure_message(&self.errors);
        }

        let stats = &self.stats;
        let mut out = format!("✓ Valid GeoJSON with {} feature(s)", stats.feature_count);
        for (count, noun) in [
            (stats.point_count, "point(s)"),
            (stats.line_count, "line(s)"),
            (stats.polygon_count, "polygon(s)"),
        ] {
            if count > 0 {
                out.push_str(&format!("\n  - {count} {noun}"));
            }
        }

        if let (Some(span), Some(min), Some(max)) =
            (stats.time_span(), stats.min_timestamp, stats.max_timestamp)
        {
            out.push_str(&format!("\n  - Time span: {:.1} years", span.years));
            out.push_str(&format!("\n  - Range: {} to {}", format_date(min), format_date(max)));
        }

        if !self.warnings.is_empty() {
            out.push_str(&format!("\n\n⚠ {} warning(s):", self.warnings.len()));
            for w in self.warnings.iter().take(MAX_LISTED_WARNINGS) {
                out.push_str(&format!("\n{w}"));
            }
            if self.warnings.len() > MAX_LISTED_WARNINGS {
                out.push_str(&format!(
                    "\n...and {} more",
                    self.warnings.len() - MAX_LISTED_WARNINGS
                ));
            }
        }
        out
    }
}

fn format_date(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ms.to_string())
}

#[cfg(test)]
mod tests {
    use super::{IssueKind, IssueLocation, TimeSpan, ValidationIssue, ValidationStats};

    #[test]
    fn issue_display_prefixes_location() {
        let issue = ValidationIssue {
            kind: IssueKind::LongitudeOutOfRange,
            location: IssueLocation::feature(2).with_ring(0).with_point(3),
            message: "longitude 200 out of range (-180 to 180)".to_string(),
        };
        assert_eq!(
            issue.to_string(),
            "Feature 2, ring 0, point 3: longitude 200 out of range (-180 to 180)"
        );

        let top = ValidationIssue {
            kind: IssueKind::NoTimestamps,
            location: IssueLocation::collection(),
            message: "no timestamps".to_string(),
        };
        assert_eq!(top.to_string(), "no timestamps");
    }

    #[test]
    fn time_span_saturates_instead_of_overflowing() {
        let mut stats = ValidationStats::default();
        stats.record_timestamp(i64::MIN);
        stats.record_timestamp(i64::MAX);
        assert_eq!(stats.time_span().unwrap().milliseconds, i64::MAX);
    }

    #[test]
    fn time_span_uses_julian_years() {
        let span = TimeSpan::from_millis(365 * 86_400_000 + 86_400_000 / 4);
        assert!((span.years - 1.0).abs() < 1e-12);
        assert!((span.days - 365.25).abs() < 1e-12);
    }
}
