//! Log-timestamp string handling.
//!
//! The inventory logging platform stores record timestamps as fixed-width
//! `YYYYMMDDHHMMSS` strings (char(14) columns). Cutoffs computed by the
//! filter normalizer use the same format so predicates compare
//! lexicographically, which for this format is equivalent to chronological
//! order.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Fixed format of the platform's log timestamp columns.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Formats a UTC datetime as a char(14) log timestamp.
pub fn format_log_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(LOG_TIMESTAMP_FORMAT).to_string()
}

/// Parses a char(14) log timestamp back into a UTC datetime.
///
/// Returns `None` for strings that are not exactly 14 digits or do not
/// denote a valid calendar datetime.
pub fn parse_log_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.len() != 14 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, LOG_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Returns true if `raw` is a well-formed char(14) log timestamp.
pub fn is_valid_log_timestamp(raw: &str) -> bool {
    parse_log_timestamp(raw).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_log_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(format_log_timestamp(ts), "20260314092653");
    }

    #[test]
    fn test_parse_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        let raw = format_log_timestamp(ts);
        assert_eq!(parse_log_timestamp(&raw), Some(ts));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(parse_log_timestamp("20260101").is_none());
        assert!(parse_log_timestamp("202601011200000").is_none());
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert!(parse_log_timestamp("202601o1120000").is_none());
    }

    #[test]
    fn test_parse_rejects_invalid_calendar_date() {
        // Month 13 is not a date even though it is 14 digits.
        assert!(parse_log_timestamp("20261301000000").is_none());
    }

    #[test]
    fn test_lexicographic_order_matches_chronological() {
        let older = format_log_timestamp(Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap());
        let newer = format_log_timestamp(Utc.with_ymd_and_hms(2026, 1, 6, 0, 0, 0).unwrap());
        assert!(older < newer);
    }
}
