use std::fs;

use geo_time_ingest::validation::{validate, IssueKind, IssueLocation};
use serde_json::{json, Value};

fn fixture(name: &str) -> Value {
    let text = fs::read_to_string(format!("tests/fixtures/{name}")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn point(lon: impl Into<Value>, lat: impl Into<Value>, ts: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [lon.into(), lat.into()]},
        "properties": {"timestamp": ts}
    })
}

fn collection(features: Vec<Value>) -> Value {
    json!({"type": "FeatureCollection", "features": features})
}

#[test]
fn regions_fixture_is_valid_with_stats() {
    let report = validate(&fixture("regions.geojson"));
    assert!(report.is_valid(), "{:?}", report.errors);
    assert!(report.warnings.is_empty());
    assert_eq!(report.stats.feature_count, 2);
    assert_eq!(report.stats.point_count, 1);
    assert_eq!(report.stats.polygon_count, 1);
    assert_eq!(report.stats.min_timestamp, Some(1000));
    assert_eq!(report.stats.max_timestamp, Some(5000));
    assert_eq!(report.stats.time_span().unwrap().milliseconds, 4000);
}

#[test]
fn longitude_out_of_range_is_an_error() {
    let report = validate(&fixture("out_of_range.geojson"));
    assert!(!report.is_valid());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, IssueKind::LongitudeOutOfRange);
    assert_eq!(
        report.errors[0].to_string(),
        "Feature 0: longitude 200 out of range (-180 to 180)"
    );
}

#[test]
fn swapped_axes_get_error_and_warning() {
    let report = validate(&collection(vec![point(10, 95, json!(1000))]));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, IssueKind::LatitudeOutOfRange);
    assert_eq!(report.issues_of(IssueKind::SuspectedSwappedAxes).count(), 1);
}

#[test]
fn non_numeric_coordinates_are_errors() {
    let report = validate(&collection(vec![point("ten", 5, json!(1000))]));
    assert_eq!(report.errors[0].kind, IssueKind::InvalidLongitude);
}

#[test]
fn empty_collection_is_valid_with_warning() {
    let report = validate(&collection(vec![]));
    assert!(report.is_valid());
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, IssueKind::EmptyCollection);
    assert_eq!(report.stats.feature_count, 0);
}

#[test]
fn top_level_problems_short_circuit() {
    for (doc, kind) in [
        (json!([1, 2]), IssueKind::NotAnObject),
        (json!({"type": "Feature"}), IssueKind::NotFeatureCollection),
        (json!({"type": "FeatureCollection"}), IssueKind::MissingFeatures),
    ] {
        let report = validate(&doc);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, kind);
        assert_eq!(report.errors[0].location, IssueLocation::collection());
        assert_eq!(report.stats.feature_count, 0);
    }
}

#[test]
fn all_missing_timestamps_is_one_collection_error() {
    let report = validate(&fixture("untimed.geojson"));
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].kind, IssueKind::NoTimestamps);
    assert_eq!(report.issues_of(IssueKind::MissingTimestamp).count(), 2);
    assert_eq!(report.stats.missing_timestamps, 2);
    assert!(report.stats.time_span().is_none());
}

#[test]
fn unparseable_timestamp_counts_as_missing() {
    let report = validate(&collection(vec![
        point(1, 1, json!("yesterday")),
        point(2, 2, json!("1950")),
    ]));
    assert!(report.is_valid());
    assert_eq!(report.issues_of(IssueKind::InvalidTimestamp).count(), 1);
    assert_eq!(report.stats.min_timestamp, Some(-631_152_000_000));
}

#[test]
fn identical_timestamps_warn() {
    let report = validate(&collection(vec![
        point(1, 1, json!(1000)),
        point(2, 2, json!(1000)),
    ]));
    assert!(report.is_valid());
    assert_eq!(report.issues_of(IssueKind::ZeroTimeSpan).count(), 1);
}

#[test]
fn polygon_ring_rules_report_ring_location() {
    let doc = collection(vec![
        json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1]]]},
            "properties": {"timestamp": 1}
        }),
        json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 0]]]},
            "properties": {"timestamp": 2}
        }),
        json!({
            "type": "Feature",
            "geometry": {"type": "Polygon", "coordinates": []},
            "properties": {"timestamp": 3}
        }),
    ]);
    let report = validate(&doc);
    let kinds: Vec<IssueKind> = report.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![IssueKind::RingNotClosed, IssueKind::RingTooShort, IssueKind::NoRings]
    );
    assert_eq!(
        report.errors[0].to_string(),
        "Feature 0, ring 0: polygon ring is not closed (first and last points must match)"
    );
}

#[test]
fn linestring_point_errors_carry_point_index() {
    let doc = collection(vec![json!({
        "type": "Feature",
        "geometry": {"type": "LineString", "coordinates": [[0, 0], [0, 100], "x"]},
        "properties": {"timestamp": 1}
    })]);
    let report = validate(&doc);
    let rendered: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "Feature 0, point 1: latitude 100 out of range (-90 to 90)".to_string(),
            "Feature 0, point 2: invalid coordinate".to_string(),
        ]
    );
}

#[test]
fn unsupported_geometry_and_missing_properties_are_warnings() {
    let doc = collection(vec![
        json!({
            "type": "Feature",
            "geometry": {"type": "MultiPoint", "coordinates": [[0, 0]]},
            "properties": {"timestamp": 1}
        }),
        json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [0, 0]}
        }),
    ]);
    let report = validate(&doc);
    assert!(report.is_valid());
    assert_eq!(report.issues_of(IssueKind::UnsupportedGeometry).count(), 1);
    assert_eq!(report.issues_of(IssueKind::MissingProperties).count(), 1);
}

#[test]
fn structural_feature_errors() {
    let doc = collection(vec![
        json!("nope"),
        json!({"type": "Thing", "geometry": {"type": "Point", "coordinates": [0, 0]}, "properties": {"timestamp": 1}}),
        json!({"type": "Feature", "properties": {"timestamp": 1}}),
        json!({"type": "Feature", "geometry": {"coordinates": [0, 0]}, "properties": {"timestamp": 1}}),
        json!({"type": "Feature", "geometry": {"type": "Point"}, "properties": {"timestamp": 1}}),
    ]);
    let report = validate(&doc);
    let kinds: Vec<IssueKind> = report.errors.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            IssueKind::FeatureNotAnObject,
            IssueKind::FeatureType,
            IssueKind::MissingGeometry,
            IssueKind::MissingGeometryType,
            IssueKind::MissingCoordinates,
        ]
    );
}

#[test]
fn validation_is_repeatable() {
    let doc = fixture("untimed.geojson");
    assert_eq!(validate(&doc), validate(&doc));
}

#[test]
fn summary_lists_first_three_warnings() {
    let features = (0..5)
        .map(|i| point(i, i, Value::Null))
        .chain([point(8, 8, json!(1)), point(9, 9, json!(2))])
        .collect();
    let summary = validate(&collection(features)).summary();
    assert!(summary.starts_with("✓ Valid GeoJSON with 7 feature(s)"));
    assert!(summary.contains("⚠ 5 warning(s):"));
    assert!(summary.ends_with("...and 2 more"));
}

#[test]
fn extreme_timestamps_do_not_overflow_the_span() {
    let doc = collection(vec![
        point(1, 1, json!(i64::MIN)),
        point(2, 2, json!(i64::MAX)),
        point(3, 3, json!(1e300)),
    ]);
    let report = validate(&doc);
    assert!(report.is_valid());
    assert_eq!(report.stats.min_timestamp, Some(i64::MIN));
    assert_eq!(report.stats.max_timestamp, Some(i64::MAX));
    let span = report.stats.time_span().unwrap();
    assert_eq!(span.milliseconds, i64::MAX);
    assert!(span.years > 0.0);
    assert!(report.summary().contains("Time span:"));
}
