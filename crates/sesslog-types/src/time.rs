use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::{Error, Result};

/// Parse a log-record timestamp (RFC3339, offset-aware) into the UTC-naive
/// form used for all internal comparison. Returns None for unparseable
/// values; a bad timestamp degrades one field, never a whole record.
pub fn parse_record_timestamp(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).naive_utc())
}

/// Render a UTC-naive timestamp as the sortable ISO string the store keeps.
pub fn to_store_timestamp(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Parse a timestamp string back out of the store.
pub fn from_store_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok()
}

/// Parse a user-supplied `--since`/`--until` value.
///
/// Accepts `YYYY-MM-DD` or `YYYY-MM-DD HH:MM[:SS]` (a `T` separator also
/// works). A date-only value used as an upper bound is promoted to the end
/// of that day so `--until 2026-01-14` includes the whole 14th.
pub fn parse_date_arg(value: &str, end_of_day: bool) -> Result<NaiveDateTime> {
    let cleaned = value.trim().replace('T', " ");
    if cleaned.is_empty() {
        return Err(Error::InvalidInput("date value must not be empty".to_string()));
    }

    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        return Ok(time.expect("in-range hms"));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Ok(parsed);
        }
    }

    Err(Error::InvalidInput(format!(
        "unrecognized date '{}' (expected YYYY-MM-DD or YYYY-MM-DD HH:MM)",
        value
    )))
}

/// Local-time rendering for display. Comparison code never touches this.
pub fn format_local(value: Option<NaiveDateTime>) -> String {
    match value {
        Some(naive) => {
            let local = Utc
                .from_utc_datetime(&naive)
                .with_timezone(&Local);
            local.format("%Y-%m-%d %H:%M").to_string()
        }
        None => "unknown".to_string(),
    }
}
