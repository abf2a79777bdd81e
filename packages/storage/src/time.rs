// ABOUTME: Timestamp helpers for TEXT datetime columns
// ABOUTME: All tables store RFC 3339 UTC strings

use chrono::{DateTime, Utc};

use crate::error::StorageError;

/// Current time as the RFC 3339 string stored in datetime columns
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse a stored RFC 3339 timestamp back into a `DateTime<Utc>`.
/// Also accepts the `YYYY-MM-DD HH:MM:SS` form SQLite's datetime() emits.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StorageError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| StorageError::InvalidData(format!("unparseable timestamp: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let now = now_rfc3339();
        let parsed = parse_timestamp(&now).unwrap();
        assert_eq!(parsed.to_rfc3339(), now);
    }

    #[test]
    fn test_sqlite_datetime_form() {
        let parsed = parse_timestamp("2026-03-01 12:30:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-03-01T12:30:00+00:00");
    }

    #[test]
    fn test_invalid_timestamp() {
        assert!(parse_timestamp("not-a-date").is_err());
    }
}
