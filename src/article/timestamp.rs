//! Lenient ISO-8601 timestamp parsing.
//!
//! The backend writes naive timestamps with fractional seconds, but older
//! records carry an offset or only a date. Anything unparseable is treated as
//! missing rather than failing the whole record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp, normalizing offset-carrying values to naive UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

pub(super) fn deserialize_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn test_parses_naive_with_fraction() {
        let parsed = parse_timestamp("2024-05-01T12:30:00.654321").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_parses_naive_without_fraction() {
        assert_eq!(
            parse_timestamp("2024-05-01T12:30:00"),
            Some(ymd_hms(2024, 5, 1, 12, 30, 0))
        );
    }

    #[test]
    fn test_offset_normalized_to_utc() {
        assert_eq!(
            parse_timestamp("2024-05-01T12:30:00+02:00"),
            Some(ymd_hms(2024, 5, 1, 10, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2024-05-01T12:30:00Z"),
            Some(ymd_hms(2024, 5, 1, 12, 30, 0))
        );
    }

    #[test]
    fn test_date_only_is_midnight() {
        assert_eq!(parse_timestamp("2024-05-01"), Some(ymd_hms(2024, 5, 1, 0, 0, 0)));
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
