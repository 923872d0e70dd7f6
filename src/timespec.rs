//! Parsing of `--start` / `--end` values into epoch milliseconds.
//!
//! Accepted forms:
//! - empty: no bound
//! - `now`
//! - epoch milliseconds, e.g. `1714557600000`
//! - RFC 3339, e.g. `2024-05-01T10:00:00Z` or `2024-05-01T12:00:00+02:00`
//! - `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`, interpreted as UTC
//! - `YYYY-MM-DD`, UTC midnight
//! - relative durations before now: `30s`, `15m`, `2h`, `7d`, `1w`

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{Error, Result};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a time bound relative to `now`.
pub fn parse(input: &str, now: DateTime<Utc>) -> Result<Option<i64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if input.eq_ignore_ascii_case("now") {
        return Ok(Some(now.timestamp_millis()));
    }
    if let Ok(ms) = input.parse::<i64>() {
        return Ok(Some(ms));
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(ts.timestamp_millis()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Ok(Some(Utc.from_utc_datetime(&naive).timestamp_millis()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| invalid(input, "invalid date"))?;
        return Ok(Some(Utc.from_utc_datetime(&midnight).timestamp_millis()));
    }
    if let Some(ago) = parse_relative(input)? {
        let at = now
            .checked_sub_signed(ago)
            .ok_or_else(|| invalid(input, "duration too large"))?;
        return Ok(Some(at.timestamp_millis()));
    }

    Err(invalid(
        input,
        "expected epoch milliseconds, RFC 3339, YYYY-MM-DD[ HH:MM:SS] or a duration like 15m",
    ))
}

/// Parses a start/end pair, rejecting ranges that run backwards.
pub fn parse_range(start: &str, end: &str, now: DateTime<Utc>) -> Result<(Option<i64>, Option<i64>)> {
    let start_ms = parse(start, now)?;
    let end_ms = parse(end, now)?;
    if let (Some(start_ms), Some(end_ms)) = (start_ms, end_ms) {
        if start_ms > end_ms {
            return Err(Error::InvalidRange { start_ms, end_ms });
        }
    }
    Ok((start_ms, end_ms))
}

fn parse_relative(input: &str) -> Result<Option<Duration>> {
    let Some(unit) = input.chars().last() else {
        return Ok(None);
    };
    let digits = &input[..input.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let n: i64 = digits.parse().map_err(|_| invalid(input, "duration too large"))?;

    let seconds = match unit {
        's' => Some(n),
        'm' => n.checked_mul(60),
        'h' => n.checked_mul(60 * 60),
        'd' => n.checked_mul(24 * 60 * 60),
        'w' => n.checked_mul(7 * 24 * 60 * 60),
        _ => return Ok(None),
    };
    seconds
        .and_then(Duration::try_seconds)
        .map(Some)
        .ok_or_else(|| invalid(input, "duration too large"))
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidTime {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
