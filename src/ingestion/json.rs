//! Simple JSON ingestion.
//!
//! Supported inputs:
//! - A GeoJSON FeatureCollection (`{"type": "FeatureCollection", "features": ...}`), passed
//!   through unchanged.
//! - A JSON array of records, or a single record object.
//!
//! Each record names its geometry kind in `type` (case-insensitive; `point` when absent):
//!
//! | `type` | geometry | coordinates from |
//! |---|---|---|
//! | `point` | Point | latitude/longitude candidate keys |
//! | `line`, `linestring`, `route` | LineString | `coordinates: [[lat, lon], ...]` |
//! | `polygon`, `area` | Polygon (one ring, auto-closed) | `coordinates: [[lat, lon], ...]` |
//!
//! Record coordinate arrays are `(lat, lon)` pairs and are swapped into `(lon, lat)`.

use serde_json::{Map, Value};

use crate::error::IngestionResult;
use crate::timestamp;
use crate::types::{
    Conversion, Feature, FeatureCollection, GeoDocument, Geometry, Position, SkipReason,
    SkippedItem, SourceFormat,
};

use super::fields::{
    is_json_reserved_field, parse_coordinate, COORDINATES_FIELD, LATITUDE_FIELDS,
    LONGITUDE_FIELDS, TIME_FIELDS, TYPE_FIELD,
};

/// Returns `true` if `value` declares itself a FeatureCollection and carries `features`.
pub fn is_feature_collection(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some("FeatureCollection")
        && value.get("features").is_some_and(|f| !f.is_null())
}

/// Convert parsed JSON into features.
///
/// A FeatureCollection is returned as [`GeoDocument::GeoJson`] without modification.
/// Otherwise every record becomes one feature; records without a usable timestamp, geometry
/// kind or coordinates are dropped and reported in [`Conversion::skipped`].
///
/// `time_field` replaces the default timestamp candidates ([`TIME_FIELDS`]).
pub fn from_json_records(value: Value, time_field: Option<&str>) -> Conversion {
    if is_feature_collection(&value) {
        tracing::debug!("input is already a FeatureCollection; passing through");
        return Conversion {
            document: GeoDocument::GeoJson(value),
            format: SourceFormat::Json,
            skipped: Vec::new(),
        };
    }

    let items = match value {
        Value::Array(items) => items,
        single => vec![single],
    };

    let mut features = Vec::with_capacity(items.len());
    let mut skipped = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match convert_item(item, time_field) {
            Ok(feature) => features.push(feature),
            Err(reason) => {
                tracing::warn!(item = index, %reason, "skipping json item");
                skipped.push(SkippedItem { index, reason });
            }
        }
    }

    Conversion {
        document: GeoDocument::Converted(FeatureCollection::new(features)),
        format: SourceFormat::Json,
        skipped,
    }
}

/// Parse JSON text and convert it in one step.
pub fn json_to_features(
    text: &str,
    time_field: Option<&str>,
) -> IngestionResult<Conversion> {
    let value = serde_json::from_str::<Value>(text)?;
    Ok(from_json_records(value, time_field))
}

fn convert_item(item: &Value, time_field: Option<&str>) -> Result<Feature, SkipReason> {
    let obj = item.as_object().ok_or(SkipReason::NotAnObject)?;

    let raw_time = find_time_value(obj, time_field).ok_or(SkipReason::MissingTimestamp)?;
    let ts = timestamp::normalize_json(raw_time).map_err(|_| SkipReason::InvalidTimestamp {
        raw: display_scalar(raw_time),
    })?;

    let geometry = match geometry_kind(obj)?.as_str() {
        "point" => point_geometry(obj)?,
        "line" | "linestring" | "route" => Geometry::LineString(coordinate_array(obj)?),
        "polygon" | "area" => {
            let ring = coordinate_array(obj)?;
            if ring.is_empty() {
                return Err(SkipReason::MissingCoordinateArray);
            }
            Geometry::closed_polygon(ring)
        }
        other => {
            return Err(SkipReason::UnknownGeometryType {
                kind: other.to_string(),
            });
        }
    };

    let mut feature = Feature::new(geometry, ts);
    for (k, v) in obj {
        let consumed = is_json_reserved_field(k) || Some(k.as_str()) == time_field;
        if !consumed {
            feature.properties.insert(k.clone(), v.clone());
        }
    }
    Ok(feature)
}

/// First present timestamp value. `null`, `""` and `false` count as absent.
fn find_time_value<'a>(obj: &'a Map<String, Value>, explicit: Option<&str>) -> Option<&'a Value> {
    let is_present = |v: &&Value| match v {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    };
    match explicit {
        Some(field) => obj.get(field).filter(is_present),
        None => TIME_FIELDS
            .iter()
            .find_map(|f| obj.get(*f).filter(is_present)),
    }
}

fn geometry_kind(obj: &Map<String, Value>) -> Result<String, SkipReason> {
    match obj.get(TYPE_FIELD) {
        None | Some(Value::Null) => Ok("point".to_string()),
        Some(Value::String(s)) if s.is_empty() => Ok("point".to_string()),
        Some(Value::String(s)) => Ok(s.to_lowercase()),
        Some(other) => Err(SkipReason::UnknownGeometryType {
            kind: other.to_string(),
        }),
    }
}

fn point_geometry(obj: &Map<String, Value>) -> Result<Geometry, SkipReason> {
    let lat = first_number(obj, LATITUDE_FIELDS);
    let lon = first_number(obj, LONGITUDE_FIELDS);
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Geometry::Point(Position::from_lat_lon(lat, lon))),
        _ => Err(SkipReason::MissingCoordinates),
    }
}

fn first_number(obj: &Map<String, Value>, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|c| obj.get(*c).and_then(as_coordinate))
}

fn as_coordinate(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_coordinate(s),
        _ => None,
    }
}

/// Read `coordinates: [[lat, lon], ...]` into canonical positions.
fn coordinate_array(obj: &Map<String, Value>) -> Result<Vec<Position>, SkipReason> {
    let entries = obj
        .get(COORDINATES_FIELD)
        .and_then(Value::as_array)
        .ok_or(SkipReason::MissingCoordinateArray)?;

    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| match entry.as_array().map(Vec::as_slice) {
            Some([lat, lon]) => match (as_coordinate(lat), as_coordinate(lon)) {
                (Some(lat), Some(lon)) => Ok(Position::from_lat_lon(lat, lon)),
                _ => Err(SkipReason::InvalidCoordinate { position }),
            },
            _ => Err(SkipReason::InvalidCoordinate { position }),
        })
        .collect()
}

fn display_scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
