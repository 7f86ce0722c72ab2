//! Geometry and coordinate rules.

use serde_json::Value;

use super::report::{IssueKind, IssueLocation};
use super::Findings;

/// Check one feature's geometry, recording errors and warnings.
pub(super) fn check_geometry(geometry: Option<&Value>, feature: usize, out: &mut Findings) {
    let loc = IssueLocation::feature(feature);

    let Some(geometry) = geometry.filter(|g| g.is_object()) else {
        out.error(IssueKind::MissingGeometry, loc, "missing or invalid geometry");
        return;
    };
    let Some(kind) = geometry.get("type").and_then(Value::as_str) else {
        out.error(IssueKind::MissingGeometryType, loc, "geometry missing 'type' field");
        return;
    };
    let coordinates = match geometry.get("coordinates") {
        None | Some(Value::Null) => {
            out.error(
                IssueKind::MissingCoordinates,
                loc,
                "geometry missing 'coordinates' field",
            );
            return;
        }
        Some(c) => c,
    };

    match kind {
        "Point" => match coordinates.as_array().filter(|c| c.len() >= 2) {
            Some(pair) => check_position(&pair[0], &pair[1], loc, out),
            None => out.error(
                IssueKind::MalformedCoordinate,
                loc,
                "Point coordinates must be [lon, lat]",
            ),
        },
        "LineString" => match coordinates.as_array().filter(|c| c.len() >= 2) {
            Some(points) => check_points(points, loc, out),
            None => out.error(
                IssueKind::TooFewPoints,
                loc,
                "LineString must have at least 2 points",
            ),
        },
        "Polygon" => match coordinates.as_array().filter(|c| !c.is_empty()) {
            Some(rings) => {
                for (r, ring) in rings.iter().enumerate() {
                    check_ring(ring, loc.with_ring(r), out);
                }
            }
            None => out.error(IssueKind::NoRings, loc, "Polygon must have at least one ring"),
        },
        other => out.warning(
            IssueKind::UnsupportedGeometry,
            loc,
            format!(
                "geometry type '{other}' is not fully supported. Supported types: Point, LineString, Polygon"
            ),
        ),
    }
}

fn check_ring(ring: &Value, loc: IssueLocation, out: &mut Findings) {
    let Some(points) = ring.as_array().filter(|p| p.len() >= 4) else {
        out.error(
            IssueKind::RingTooShort,
            loc,
            "polygon ring must have at least 4 points",
        );
        return;
    };

    let first = points.first().and_then(as_pair);
    let last = points.last().and_then(as_pair);
    if let (Some(first), Some(last)) = (first, last) {
        if first != last {
            out.error(
                IssueKind::RingNotClosed,
                loc,
                "polygon ring is not closed (first and last points must match)",
            );
        }
    }

    check_points(points, loc, out);
}

fn check_points(points: &[Value], loc: IssueLocation, out: &mut Findings) {
    for (i, coord) in points.iter().enumerate() {
        let at = loc.with_point(i);
        match coord.as_array().filter(|c| c.len() >= 2) {
            Some(pair) => check_position(&pair[0], &pair[1], at, out),
            None => out.error(IssueKind::MalformedCoordinate, at, "invalid coordinate"),
        }
    }
}

/// Range and axis-order checks for one `[lon, lat]` pair.
fn check_position(lon: &Value, lat: &Value, loc: IssueLocation, out: &mut Findings) {
    let lon_num = lon.as_f64();
    let lat_num = lat.as_f64();

    match lon_num {
        None => out.error(IssueKind::InvalidLongitude, loc, format!("invalid longitude: {lon}")),
        Some(v) if !(-180.0..=180.0).contains(&v) => out.error(
            IssueKind::LongitudeOutOfRange,
            loc,
            format!("longitude {v} out of range (-180 to 180)"),
        ),
        Some(_) => {}
    }

    match lat_num {
        None => out.error(IssueKind::InvalidLatitude, loc, format!("invalid latitude: {lat}")),
        Some(v) if !(-90.0..=90.0).contains(&v) => out.error(
            IssueKind::LatitudeOutOfRange,
            loc,
            format!("latitude {v} out of range (-90 to 90)"),
        ),
        Some(_) => {}
    }

    if let (Some(lon), Some(lat)) = (lon_num, lat_num) {
        if lon.abs() <= 90.0 && lat.abs() > 90.0 {
            out.warning(
                IssueKind::SuspectedSwappedAxes,
                loc,
                "coordinates may be in wrong order. GeoJSON uses [longitude, latitude]",
            );
        }
    }
}

fn as_pair(coord: &Value) -> Option<(f64, f64)> {
    let arr = coord.as_array()?;
    Some((arr.first()?.as_f64()?, arr.get(1)?.as_f64()?))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::check_position;
    use crate::validation::report::{IssueKind, IssueLocation};
    use crate::validation::Findings;

    fn kinds(issues: &[crate::validation::ValidationIssue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn in_range_position_is_clean() {
        let mut out = Findings::default();
        check_position(&json!(-180), &json!(90), IssueLocation::feature(0), &mut out);
        assert!(out.errors.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn non_numeric_values_are_invalid_not_out_of_range() {
        let mut out = Findings::default();
        check_position(&json!("10"), &json!(null), IssueLocation::feature(0), &mut out);
        assert_eq!(
            kinds(&out.errors),
            vec![IssueKind::InvalidLongitude, IssueKind::InvalidLatitude]
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn high_latitude_with_small_longitude_warns_about_axis_order() {
        let mut out = Findings::default();
        check_position(&json!(10), &json!(95), IssueLocation::feature(0), &mut out);
        assert_eq!(kinds(&out.errors), vec![IssueKind::LatitudeOutOfRange]);
        assert_eq!(kinds(&out.warnings), vec![IssueKind::SuspectedSwappedAxes]);
    }
}
