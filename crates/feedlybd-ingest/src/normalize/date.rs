//! Publication date parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats without an offset, interpreted as UTC. `YYYY-MM-DD HH:MM:SS` is what
/// JSON-envelope relays emit.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Offset-bearing formats tried after RFC 2822 / RFC 3339 fail.
const OFFSET_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Parse a feed date string to epoch milliseconds.
///
/// Accepts RFC 2822 (`pubDate`), RFC 3339 (`published`/`updated`/`dc:date`),
/// and a few common relaxed forms. Returns `None` when nothing matches.
#[must_use]
pub fn parse_published(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    // Feeds often carry a weekday that disagrees with the date, which the
    // RFC 2822 parser rejects. Drop it and retry.
    let without_weekday = raw
        .split_once(',')
        .filter(|(day, _)| day.len() <= 9 && day.chars().all(char::is_alphabetic))
        .map_or(raw, |(_, rest)| rest.trim());

    let numeric_zone = with_numeric_zone(without_weekday);
    for candidate in [without_weekday, numeric_zone.as_str()] {
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(candidate, format) {
                return Some(dt.timestamp_millis());
            }
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// `%z` only understands numeric offsets, so spell the UTC zone names as one.
fn with_numeric_zone(raw: &str) -> String {
    for zone in [" GMT", " UTC", " UT", " Z"] {
        if let Some(stem) = raw.strip_suffix(zone) {
            return format!("{stem} +0000");
        }
    }
    raw.to_string()
}
