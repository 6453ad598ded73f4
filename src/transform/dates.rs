//! Lenient date parsing for customer date columns
//!
//! Accepts the date shapes commonly found in exported customer files. A value
//! that matches none of them, or that falls outside the nanosecond timestamp
//! range, yields `None`, the null-date sentinel.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

// Month-first before day-first: `01/02/2020` is January 2nd.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

/// Earliest timestamp representable as signed nanoseconds since the epoch
pub fn min_timestamp() -> NaiveDateTime {
    DateTime::from_timestamp_nanos(i64::MIN).naive_utc()
}

/// Latest timestamp representable as signed nanoseconds since the epoch
pub fn max_timestamp() -> NaiveDateTime {
    DateTime::from_timestamp_nanos(i64::MAX).naive_utc()
}

/// Parse a date or timestamp, returning `None` when nothing matches
///
/// Surrounding whitespace is ignored. Date-only values resolve to midnight and
/// values carrying a UTC offset are normalised to UTC. Timestamps before
/// 1677-09-21 or after 2262-04-11 are rejected.
pub fn parse_lenient(value: &str) -> Option<NaiveDateTime> {
    parse_any(value.trim()).filter(|dt| (min_timestamp()..=max_timestamp()).contains(dt))
}

fn parse_any(value: &str) -> Option<NaiveDateTime> {
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt);
    }

    parse_compact(value)
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// `YYYYMMDD` with no separators
fn parse_compact(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
