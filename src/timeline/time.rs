use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::TimelineError;

/// Naive forms are what the capture API emits; they are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp from RFC 3339, naive ISO, a bare date or epoch milliseconds.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimelineError> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    if let Ok(ms) = trimmed.parse::<i64>() {
        return from_epoch_millis(ms);
    }

    Err(TimelineError::InvalidTimestamp(s.to_string()))
}

pub fn from_epoch_millis(ms: i64) -> Result<DateTime<Utc>, TimelineError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| TimelineError::InvalidTimestamp(ms.to_string()))
}

pub fn minutes(n: u32) -> Duration {
    Duration::minutes(i64::from(n))
}

/// `HH:MM:SS`, or `HH:MM` when seconds are zero.
pub fn format_clock(dt: &DateTime<Utc>) -> String {
    let full = dt.format("%H:%M:%S").to_string();
    match full.strip_suffix(":00") {
        Some(short) => short.to_string(),
        None => full,
    }
}

pub fn format_range(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    format!("{}–{}", format_clock(start), format_clock(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_timestamp("2025-01-15T10:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_forms_as_utc() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-01-15T10:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-15 10:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-15 10:30").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2025-01-15T10:30:00.250").unwrap(),
            expected + Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_parse_date_and_epoch() {
        assert_eq!(
            parse_timestamp("2025-01-15").unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_timestamp("1736935200000").unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse_timestamp("yesterday"),
            Err(TimelineError::InvalidTimestamp("yesterday".to_string()))
        );
        assert!(parse_timestamp("2025-13-40").is_err());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(&Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()), "10:30");
        assert_eq!(format_clock(&Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 5).unwrap()), "10:30:05");
    }
}
