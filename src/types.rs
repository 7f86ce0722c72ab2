//! Core data model for converted geographic data.
//!
//! Converters produce a [`FeatureCollection`] of [`Feature`]s whose [`Geometry`] always stores
//! positions in canonical `(longitude, latitude)` order. A GeoJSON input that is already a
//! FeatureCollection is carried through untouched as [`GeoDocument::GeoJson`].

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::IngestionResult;

/// A single `(longitude, latitude)` position. Serializes as `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Position {
    /// Create a position from canonical `(lon, lat)` order.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Create a position from source data written in `(lat, lon)` order.
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self { lon, lat }
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lon, self.lat].serialize(serializer)
    }
}

/// Geometry kinds the pipeline produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Position),
    /// Ordered path of at least two positions.
    LineString(Vec<Position>),
    /// Linear rings; each ring is closed (first position equals last).
    Polygon(Vec<Vec<Position>>),
}

impl Geometry {
    /// GeoJSON geometry type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::Polygon(_) => "Polygon",
        }
    }

    /// Build a single-ring polygon, appending the first position when the ring is open.
    ///
    /// Closing an already-closed ring leaves it unchanged.
    pub fn closed_polygon(mut ring: Vec<Position>) -> Self {
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        Self::Polygon(vec![ring])
    }
}

/// One geographic record: geometry plus free-form properties.
///
/// `properties["timestamp"]` carries the normalized epoch-millisecond timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Create a feature stamped with `timestamp` (epoch milliseconds) as its first property.
    pub fn new(geometry: Geometry, timestamp: i64) -> Self {
        let mut properties = Map::new();
        properties.insert("timestamp".to_string(), Value::from(timestamp));
        Self {
            geometry,
            properties,
        }
    }

    /// The normalized timestamp, if present.
    pub fn timestamp(&self) -> Option<i64> {
        self.properties.get("timestamp").and_then(Value::as_i64)
    }
}

/// Ordered collection of features from one conversion pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` when the collection holds no features.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Result of format conversion: either a collection built by the converters, or a GeoJSON
/// FeatureCollection passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoDocument {
    /// Built from CSV rows or simple JSON records.
    Converted(FeatureCollection),
    /// Input already declared itself a FeatureCollection; kept verbatim.
    GeoJson(Value),
}

impl GeoDocument {
    /// The document as a GeoJSON value, borrowing when no serialization is needed.
    pub fn as_geojson(&self) -> IngestionResult<Cow<'_, Value>> {
        match self {
            Self::Converted(collection) => Ok(Cow::Owned(serde_json::to_value(collection)?)),
            Self::GeoJson(value) => Ok(Cow::Borrowed(value)),
        }
    }

    /// Consume the document into an owned GeoJSON value.
    pub fn into_geojson(self) -> IngestionResult<Value> {
        match self {
            Self::Converted(collection) => Ok(serde_json::to_value(collection)?),
            Self::GeoJson(value) => Ok(value),
        }
    }

    /// The typed collection, when the document was built by a converter.
    pub fn as_collection(&self) -> Option<&FeatureCollection> {
        match self {
            Self::Converted(collection) => Some(collection),
            Self::GeoJson(_) => None,
        }
    }

    /// Number of features in the document (0 for a passthrough without a `features` array).
    pub fn feature_count(&self) -> usize {
        match self {
            Self::Converted(collection) => collection.len(),
            Self::GeoJson(value) => value
                .get("features")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
        }
    }
}

/// Source format an input was read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Simple JSON records or GeoJSON.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "geojson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Why a row or item was dropped during conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// JSON item is not an object.
    NotAnObject,
    /// No usable latitude/longitude pair and no waypoint path.
    MissingCoordinates,
    /// A waypoint in a `lat,lon;lat,lon` path did not parse.
    InvalidWaypoint { raw: String },
    /// Line/polygon item without a `coordinates` array.
    MissingCoordinateArray,
    /// Entry of a `coordinates` array is not a `[lat, lon]` number pair.
    InvalidCoordinate { position: usize },
    /// JSON item with none of the timestamp fields.
    MissingTimestamp,
    /// Timestamp present but not normalizable.
    InvalidTimestamp { raw: String },
    /// JSON `type` is not a known geometry kind.
    UnknownGeometryType { kind: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "item is not a JSON object"),
            Self::MissingCoordinates => write!(f, "no valid coordinates"),
            Self::InvalidWaypoint { raw } => write!(f, "invalid waypoint '{raw}'"),
            Self::MissingCoordinateArray => write!(f, "missing coordinates array"),
            Self::InvalidCoordinate { position } => {
                write!(f, "coordinate at position {position} is not a [lat, lon] pair")
            }
            Self::MissingTimestamp => write!(f, "no timestamp"),
            Self::InvalidTimestamp { raw } => write!(f, "invalid timestamp '{raw}'"),
            Self::UnknownGeometryType { kind } => write!(f, "unknown geometry type '{kind}'"),
        }
    }
}

/// A dropped row (CSV, 0-based data row index) or item (JSON, 0-based array index).
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub index: usize,
    pub reason: SkipReason,
}

/// Output of a converter.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub document: GeoDocument,
    /// Format the input was read as.
    pub format: SourceFormat,
    /// Rows/items dropped along the way, in input order.
    pub skipped: Vec<SkippedItem>,
}
