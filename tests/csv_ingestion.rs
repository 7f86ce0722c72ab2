use std::fs;

use geo_time_ingest::ingestion::csv::{csv_to_features, from_rows, parse_rows};
use geo_time_ingest::types::{Geometry, Position, SkipReason, SourceFormat};
use geo_time_ingest::IngestionError;
use serde_json::json;

#[test]
fn city_founding_csv_becomes_points() {
    let text = fs::read_to_string("tests/fixtures/city_founding.csv").unwrap();
    let conv = csv_to_features(&text, None).unwrap();

    assert_eq!(conv.format, SourceFormat::Csv);
    assert!(conv.skipped.is_empty());
    let fc = conv.document.as_collection().unwrap();
    assert_eq!(fc.len(), 2);

    assert_eq!(fc.features[0].geometry, Geometry::Point(Position::new(20.0, 10.0)));
    assert_eq!(fc.features[0].timestamp(), Some(-2_208_988_800_000));
    assert_eq!(fc.features[0].properties.get("name"), Some(&json!("A")));
    assert_eq!(fc.features[1].geometry, Geometry::Point(Position::new(40.0, 30.0)));
    assert_eq!(fc.features[1].properties.get("name"), Some(&json!("B")));
}

#[test]
fn coordinate_and_time_columns_are_not_copied_to_properties() {
    let conv = csv_to_features("year,lat,lng,Y,name\n1900,1,2,3,A\n", None).unwrap();
    let fc = conv.document.as_collection().unwrap();
    assert_eq!(fc.features[0].geometry, Geometry::Point(Position::new(2.0, 1.0)));
    let keys: Vec<&str> = fc.features[0].properties.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["timestamp", "name"]);
}

#[test]
fn quoted_waypoints_become_a_linestring() {
    let text = "timestamp,name,waypoints\n1900,Trip,\"10,20;15,25\"\n";
    let conv = csv_to_features(text, None).unwrap();
    let fc = conv.document.as_collection().unwrap();

    assert_eq!(
        fc.features[0].geometry,
        Geometry::LineString(vec![Position::new(20.0, 10.0), Position::new(25.0, 15.0)])
    );
    let geojson = serde_json::to_value(&fc.features[0].geometry).unwrap();
    assert_eq!(geojson, json!({"type": "LineString", "coordinates": [[20.0, 10.0], [25.0, 15.0]]}));
}

#[test]
fn explorer_routes_fixture_parses_dates_and_paths() {
    let text = fs::read_to_string("tests/fixtures/explorer_routes.csv").unwrap();
    let conv = csv_to_features(&text, None).unwrap();
    let fc = conv.document.as_collection().unwrap();

    assert_eq!(fc.len(), 2);
    match &fc.features[1].geometry {
        Geometry::LineString(path) => assert_eq!(path.len(), 3),
        other => panic!("expected LineString, got {other:?}"),
    }
    assert!(fc.features[1].timestamp().unwrap() < fc.features[0].timestamp().unwrap());
}

#[test]
fn rows_without_coordinates_or_time_are_skipped() {
    let text = "timestamp,lat,lon\n1900,10,20\n1901,,\nnever,1,2\n1903,NaN,5\n";
    let conv = csv_to_features(text, None).unwrap();

    assert_eq!(conv.document.feature_count(), 1);
    let reasons: Vec<(usize, &SkipReason)> =
        conv.skipped.iter().map(|s| (s.index, &s.reason)).collect();
    assert_eq!(
        reasons,
        vec![
            (1, &SkipReason::MissingCoordinates),
            (
                2,
                &SkipReason::InvalidTimestamp {
                    raw: "never".to_string()
                }
            ),
            (3, &SkipReason::MissingCoordinates),
        ]
    );
}

#[test]
fn missing_time_column_lists_candidates_and_headers() {
    let text = fs::read_to_string("tests/fixtures/no_time_column.csv").unwrap();
    let err = csv_to_features(&text, None).unwrap_err();
    match &err {
        IngestionError::NoTimestampField { candidates, headers } => {
            assert_eq!(candidates.len(), 5);
            assert_eq!(headers, &vec!["name", "latitude", "longitude"]);
        }
        other => panic!("expected NoTimestampField, got {other:?}"),
    }
    assert!(err.to_string().contains("timestamp"));
}

#[test]
fn explicit_time_field_is_used() {
    let text = "founded,lat,lon\n1900,1,2\n";
    let conv = csv_to_features(text, Some("founded")).unwrap();
    let fc = conv.document.as_collection().unwrap();
    assert_eq!(fc.features[0].timestamp(), Some(-2_208_988_800_000));
    assert!(!fc.features[0].properties.contains_key("founded"));

    let err = csv_to_features(text, Some("when")).unwrap_err();
    assert!(matches!(err, IngestionError::NoTimestampField { .. }));
}

#[test]
fn header_only_input_is_empty() {
    let err = csv_to_features("timestamp,lat,lon\n", None).unwrap_err();
    assert!(matches!(err, IngestionError::EmptyInput { .. }));
}

#[test]
fn crlf_blank_lines_and_short_rows_are_tolerated() {
    let rows = parse_rows("timestamp,lat,lon,name\r\n1900,1,2\r\n\r\n1950,3,4,B\r\n").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("name"), Some(""));

    let conv = from_rows(&rows, None).unwrap();
    assert_eq!(conv.document.feature_count(), 2);
}
