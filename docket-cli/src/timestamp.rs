use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used when rendering timestamps for output.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[DISPLAY_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a timestamp into unix milliseconds.
///
/// Accepts RFC 3339 (`2024-05-01T09:30:00+02:00`), or a date and time without offset
/// (`2024-05-01 09:30:00`), or just a date, the latter two being interpreted as UTC.
#[must_use]
pub fn parse_millis(input: &str) -> Option<i64> {
    let input = input.trim();

    if let Ok(e) = DateTime::parse_from_rfc3339(input) {
        return Some(e.timestamp_millis());
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|e| e.and_hms_opt(0, 0, 0))
        })
        .map(|e| e.and_utc().timestamp_millis())
}

/// Render unix milliseconds as `YYYY-MM-DD HH:MM:SS` in UTC.
#[must_use]
pub fn format_millis(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|e| e.format(DISPLAY_FORMAT).to_string())
}
