use geo_time_ingest::timestamp::{normalize, normalize_json, year_to_epoch_ms};
use geo_time_ingest::IngestionError;
use serde_json::json;

const Y1900: i64 = -2_208_988_800_000;
const Y1950: i64 = -631_152_000_000;

#[test]
fn numeric_and_string_years_agree() {
    assert_eq!(normalize(1900_i64).unwrap(), Y1900);
    assert_eq!(normalize("1900").unwrap(), Y1900);
    assert_eq!(normalize(1900.0).unwrap(), Y1900);
    assert_eq!(normalize_json(&json!(1950)).unwrap(), Y1950);
    assert_eq!(normalize_json(&json!("1950")).unwrap(), Y1950);
}

#[test]
fn year_to_epoch_ms_matches_normalize() {
    for year in [1000_i64, 1492, 1900, 1970, 2024, 9999] {
        assert_eq!(year_to_epoch_ms(year), Some(normalize(year).unwrap()));
    }
}

#[test]
fn epoch_milliseconds_pass_through() {
    assert_eq!(normalize(1_600_000_000_000_i64).unwrap(), 1_600_000_000_000);
    assert_eq!(normalize_json(&json!(0)).unwrap(), 0);
    assert_eq!(normalize_json(&json!(-86_400_000)).unwrap(), -86_400_000);
}

#[test]
fn date_strings_parse_in_utc() {
    assert_eq!(normalize("2020-01-01T00:00:00Z").unwrap(), 1_577_836_800_000);
    assert_eq!(normalize("2020-01-01").unwrap(), 1_577_836_800_000);
    assert_eq!(normalize("  2020-01-01  ").unwrap(), 1_577_836_800_000);
    assert_eq!(normalize("06/15/1950").unwrap(), normalize("1950-06-15").unwrap());
    assert_eq!(normalize("1950-06").unwrap(), normalize("1950-06-01").unwrap());
}

#[test]
fn pre_epoch_dates_are_negative() {
    let ms = normalize("1804-05-14").unwrap();
    assert!(ms < Y1900);
}

#[test]
fn decade_style_text_falls_back_to_year() {
    assert_eq!(normalize("1900s").unwrap(), Y1900);
}

#[test]
fn garbage_is_rejected_with_raw_value() {
    let err = normalize("not a date").unwrap_err();
    match err {
        IngestionError::InvalidTimestamp { raw } => assert_eq!(raw, "not a date"),
        other => panic!("expected InvalidTimestamp, got {other:?}"),
    }
    assert!(normalize_json(&json!(true)).is_err());
    assert!(normalize_json(&json!([1900])).is_err());
}
