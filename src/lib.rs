//! `geo-time-ingest` turns loosely structured user uploads into a validated, time-stamped GeoJSON
//! FeatureCollection that a time-slider map can render safely.
//!
//! The primary entrypoints are [`ingestion::ingest`] (bytes + filename) and
//! [`ingestion::ingest_from_path`]. Both run a pre-flight size check, sniff the format, convert,
//! and validate, returning a [`ingestion::Dataset`] or a single [`IngestionError`].
//!
//! ## What you can ingest
//!
//! - **CSV** with a header row. The timestamp column is the first of `timestamp`, `date`,
//!   `time`, `year`, `datetime`. Points come from `latitude`/`lat`/`y` and
//!   `longitude`/`lon`/`lng`/`long`/`x`; a `waypoints`/`coordinates`/`path` column holding
//!   `lat,lon;lat,lon` becomes a LineString.
//! - **Simple JSON**: an array of records (or one record) with a `type` of point, line or
//!   polygon; line/polygon `coordinates` are `[lat, lon]` pairs.
//! - **GeoJSON**: a FeatureCollection, passed through unchanged and then validated.
//!
//! Output positions are always `[longitude, latitude]`, and every converted feature carries
//! `properties.timestamp` in epoch milliseconds (see [`timestamp`]).
//!
//! ## Quick example
//!
//! ```rust
//! use geo_time_ingest::ingestion::{ingest, IngestionOptions};
//! use geo_time_ingest::types::{Geometry, Position};
//!
//! # fn main() -> Result<(), geo_time_ingest::IngestionError> {
//! let csv = "timestamp,lat,lon,name\n1900,10,20,A\n";
//! let ds = ingest(csv.as_bytes(), "cities.csv", &IngestionOptions::default())?;
//!
//! let collection = ds.document.as_collection().unwrap();
//! assert_eq!(collection.features[0].geometry, Geometry::Point(Position::new(20.0, 10.0)));
//! assert!(ds.report.is_valid());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: unified entrypoints, format detection, CSV/JSON converters, observers
//! - [`validation`]: GeoJSON validation report and load summary
//! - [`timestamp`]: timestamp normalization
//! - [`types`]: canonical geographic data model
//! - [`error`]: error type shared across the pipeline

pub mod error;
pub mod ingestion;
pub mod timestamp;
pub mod types;
pub mod validation;

pub use error::{IngestionError, IngestionResult};
