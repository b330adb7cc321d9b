//! ISO-8601 parsing for the date strings carried by extraction results.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parses an ISO-8601 date or date-time into UTC.
///
/// Accepts offsets (including `Z`), naive date-times which are taken as UTC,
/// and plain dates which resolve to midnight UTC. Returns `None` for anything else.
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    parse_iso8601_local(value).map(|date_time| date_time.with_timezone(&Utc))
}

/// Parses an ISO-8601 date or date-time keeping the offset it was written with,
/// so calendar fields read the local date. Naive forms carry a zero offset.
pub fn parse_iso8601_local(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time);
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}
