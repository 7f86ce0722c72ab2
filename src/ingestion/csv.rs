//! CSV ingestion: header-keyed row parsing and row-to-feature conversion.
//!
//! Rules:
//!
//! - The first non-blank line is the header; every later non-blank line is a row.
//! - Cells are trimmed. A row with fewer cells than headers gets `""` for the missing trailing
//!   cells; extra cells are ignored.
//! - Quoted fields (RFC 4180) may contain commas.
//! - No type inference happens here; [`from_rows`] decides which columns are coordinates and
//!   which is the timestamp.

use serde_json::Value;

use crate::error::{IngestionError, IngestionResult};
use crate::timestamp;
use crate::types::{
    Conversion, Feature, FeatureCollection, GeoDocument, Geometry, Position, SkipReason,
    SkippedItem, SourceFormat,
};

use super::fields::{
    is_csv_coordinate_field, parse_coordinate, LATITUDE_FIELDS, LONGITUDE_FIELDS, PATH_FIELDS,
    TIMESTAMP_PROPERTY, TIME_FIELDS,
};

/// One data row: `(header, raw cell)` pairs in source column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Build a row from `(header, value)` pairs.
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    /// Cell value by header. With duplicate headers the last column wins.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the header exists in this row.
    pub fn contains(&self, header: &str) -> bool {
        self.cells.iter().any(|(h, _)| h == header)
    }

    /// Iterate `(header, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    /// Header names in column order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }
}

/// Split CSV text into header-keyed rows.
///
/// Fails with [`IngestionError::EmptyInput`] unless there is a header line and at least one
/// non-blank data line.
pub fn parse_rows(text: &str) -> IngestionResult<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }
        if let Some(names) = &headers {
            let cells = names
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_owned()))
                .collect();
            rows.push(RawRow::new(cells));
        } else {
            headers = Some(record.iter().map(str::to_owned).collect());
        }
    }

    if rows.is_empty() {
        return Err(IngestionError::EmptyInput {
            message: "CSV must have at least a header row and one data row".to_string(),
        });
    }
    Ok(rows)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record.get(0).is_some_and(str::is_empty)
}

/// Convert parsed rows into point and line features.
///
/// The timestamp column is `time_field` when given, otherwise the first of
/// [`TIME_FIELDS`] present in the first row. Fails with [`IngestionError::NoTimestampField`]
/// if there is none.
///
/// Per row, a non-empty path column ([`PATH_FIELDS`], `lat,lon;lat,lon`) yields a LineString;
/// otherwise the first parseable latitude and longitude candidates yield a Point. Rows with
/// neither, or with an unparseable timestamp, are dropped and reported in
/// [`Conversion::skipped`].
pub fn from_rows(rows: &[RawRow], time_field: Option<&str>) -> IngestionResult<Conversion> {
    let first = rows.first().ok_or_else(|| IngestionError::EmptyInput {
        message: "no data rows".to_string(),
    })?;
    let time_field = detect_time_field(first, time_field)?;
    tracing::debug!(time_field, rows = rows.len(), "converting csv rows");

    let mut features = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match convert_row(row, time_field) {
            Ok(feature) => features.push(feature),
            Err(reason) => {
                tracing::warn!(row = index, %reason, "skipping csv row");
                skipped.push(SkippedItem { index, reason });
            }
        }
    }

    Ok(Conversion {
        document: GeoDocument::Converted(FeatureCollection::new(features)),
        format: SourceFormat::Csv,
        skipped,
    })
}

/// Parse CSV text and convert it in one step.
pub fn csv_to_features(text: &str, time_field: Option<&str>) -> IngestionResult<Conversion> {
    let rows = parse_rows(text)?;
    from_rows(&rows, time_field)
}

fn detect_time_field<'a>(first: &'a RawRow, explicit: Option<&'a str>) -> IngestionResult<&'a str> {
    let candidates: Vec<&str> = match explicit {
        Some(field) => vec![field],
        None => TIME_FIELDS.to_vec(),
    };
    candidates
        .iter()
        .copied()
        .find(|c| first.contains(c))
        .ok_or_else(|| IngestionError::NoTimestampField {
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            headers: first.headers().map(str::to_owned).collect(),
        })
}

fn convert_row(row: &RawRow, time_field: &str) -> Result<Feature, SkipReason> {
    let geometry = match first_non_empty(row, PATH_FIELDS) {
        Some(path) => Geometry::LineString(parse_waypoints(path)?),
        None => {
            let lat = first_coordinate(row, LATITUDE_FIELDS);
            let lon = first_coordinate(row, LONGITUDE_FIELDS);
            match (lat, lon) {
                (Some(lat), Some(lon)) => Geometry::Point(Position::from_lat_lon(lat, lon)),
                _ => return Err(SkipReason::MissingCoordinates),
            }
        }
    };

    let raw_time = row.get(time_field).unwrap_or("");
    let ts = timestamp::normalize(raw_time).map_err(|_| SkipReason::InvalidTimestamp {
        raw: raw_time.to_string(),
    })?;

    let mut feature = Feature::new(geometry, ts);
    feature.properties.extend(passthrough_properties(row, time_field));
    Ok(feature)
}

fn passthrough_properties<'a>(
    row: &'a RawRow,
    time_field: &'a str,
) -> impl Iterator<Item = (String, Value)> + 'a {
    row.iter()
        .filter(move |(k, _)| {
            *k != time_field && *k != TIMESTAMP_PROPERTY && !is_csv_coordinate_field(k)
        })
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
}

fn first_non_empty<'a>(row: &'a RawRow, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|c| row.get(c).filter(|v| !v.is_empty()))
}

fn first_coordinate(row: &RawRow, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|c| row.get(c).and_then(parse_coordinate))
}

/// Parse `lat,lon;lat,lon;...` into canonical positions.
fn parse_waypoints(path: &str) -> Result<Vec<Position>, SkipReason> {
    path.split(';')
        .map(|point| {
            let mut parts = point.split(',').map(parse_coordinate);
            match (parts.next().flatten(), parts.next().flatten()) {
                (Some(lat), Some(lon)) => Ok(Position::from_lat_lon(lat, lon)),
                _ => Err(SkipReason::InvalidWaypoint {
                    raw: point.trim().to_string(),
                }),
            }
        })
        .collect()
}
