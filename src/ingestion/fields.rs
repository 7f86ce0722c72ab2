//! Recognized field names, per semantic role.
//!
//! These lists are part of the input format contract. Each role is resolved by trying its
//! candidates in the order listed here; the first usable field wins. Matching is case-sensitive.

/// Timestamp column/key candidates.
pub const TIME_FIELDS: &[&str] = &["timestamp", "date", "time", "year", "datetime"];

/// Latitude candidates.
pub const LATITUDE_FIELDS: &[&str] = &["latitude", "lat", "y"];

/// Longitude candidates.
pub const LONGITUDE_FIELDS: &[&str] = &["longitude", "lon", "lng", "long", "x"];

/// CSV columns holding a `lat,lon;lat,lon;...` path.
pub const PATH_FIELDS: &[&str] = &["waypoints", "coordinates", "path"];

/// JSON key selecting the geometry kind.
pub const TYPE_FIELD: &str = "type";

/// JSON key holding a `[[lat, lon], ...]` array for lines and polygons.
pub const COORDINATES_FIELD: &str = "coordinates";

/// Property key carrying the normalized timestamp.
pub const TIMESTAMP_PROPERTY: &str = "timestamp";

/// Returns `true` if a CSV column is consumed as coordinates (compared lowercased).
pub fn is_csv_coordinate_field(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    LATITUDE_FIELDS
        .iter()
        .chain(LONGITUDE_FIELDS)
        .chain(PATH_FIELDS)
        .any(|f| *f == lower)
}

/// Returns `true` if a JSON key is consumed as coordinates, geometry type or time.
pub fn is_json_reserved_field(name: &str) -> bool {
    name == TYPE_FIELD
        || name == COORDINATES_FIELD
        || LATITUDE_FIELDS
            .iter()
            .chain(LONGITUDE_FIELDS)
            .chain(TIME_FIELDS)
            .any(|f| *f == name)
}

/// Parse a coordinate cell. Non-finite values ("NaN", "inf") are rejected.
pub(crate) fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
