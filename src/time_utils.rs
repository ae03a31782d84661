// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and UTC day arithmetic.
//!
//! Day-based rules (daily limits, streaks) use the UTC calendar day.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The UTC calendar day a timestamp falls in.
pub fn utc_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Whether two timestamps fall in the same UTC calendar day.
pub fn same_utc_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    utc_day(a) == utc_day(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_same_utc_day_across_midnight() {
        let before = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 1).unwrap();
        assert!(!same_utc_day(before, after));
        assert!(same_utc_day(before, before));
    }

    #[test]
    fn test_format_uses_z_suffix() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 14, 12, 30, 0).unwrap();
        assert_eq!(format_utc_rfc3339(ts), "2026-03-14T12:30:00Z");
    }
}
