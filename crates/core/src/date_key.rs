//! Date bucket keys and display formatting.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

use crate::config::DateKeyResolution;

/// Timestamp layout used by the platform API, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const SOURCE_TIMESTAMP: &str = "%a %b %d %H:%M:%S %z %Y";

/// Display layout for the template `date` field.
const DISPLAY_FORMAT: &str = "%d %b, %Y  %H:%M";

/// Digits-only bucket key, most significant unit first.
///
/// Keys of the same resolution have a fixed width, so lexical order is
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    /// Full-precision key: RFC 3339 UTC with milliseconds, digits only
    /// (`YYYYMMDDhhmmssSSS`).
    pub fn instant(date: &DateTime<Utc>) -> Self {
        Self::from_formatted(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Calendar-day key in UTC (`YYYYMMDD`).
    pub fn day(date: &DateTime<Utc>) -> Self {
        Self::from_formatted(&date.format("%Y-%m-%d").to_string())
    }

    pub fn with_resolution(date: &DateTime<Utc>, resolution: DateKeyResolution) -> Self {
        match resolution {
            DateKeyResolution::Day => Self::day(date),
            DateKeyResolution::Instant => Self::instant(date),
        }
    }

    fn from_formatted(formatted: &str) -> Self {
        DateKey(formatted.chars().filter(char::is_ascii_digit).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Formats a timestamp for display, e.g. `05 Jan, 2020  14:03`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Parses a platform timestamp, falling back to RFC 3339.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_str(value, SOURCE_TIMESTAMP)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|date: DateTime<FixedOffset>| date.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
            + chrono::Duration::milliseconds(ms as i64)
    }

    #[test]
    fn instant_key_keeps_millisecond_digits() {
        let key = DateKey::instant(&at(2020, 1, 2, 3, 4, 5, 678));
        assert_eq!(key.as_str(), "20200102030405678");

        let whole_second = DateKey::instant(&at(2020, 1, 2, 3, 4, 5, 0));
        assert_eq!(whole_second.as_str(), "20200102030405000");
    }

    #[test]
    fn same_day_shares_a_day_key() {
        let morning = DateKey::day(&at(2021, 6, 30, 0, 0, 1, 0));
        let night = DateKey::day(&at(2021, 6, 30, 23, 59, 59, 999));
        assert_eq!(morning, night);
        assert_eq!(morning.as_str(), "20210630");
    }

    #[test]
    fn different_days_order_chronologically() {
        let dates = [
            at(2019, 12, 31, 23, 59, 59, 0),
            at(2020, 1, 1, 0, 0, 0, 0),
            at(2020, 1, 9, 12, 0, 0, 0),
            at(2020, 1, 10, 1, 0, 0, 0),
            at(2020, 11, 2, 1, 0, 0, 0),
        ];
        for pair in dates.windows(2) {
            let (earlier, later) = (DateKey::day(&pair[0]), DateKey::day(&pair[1]));
            assert_ne!(earlier, later);
            assert!(earlier.as_str() < later.as_str());

            let (earlier, later) = (DateKey::instant(&pair[0]), DateKey::instant(&pair[1]));
            assert!(earlier < later);
        }
    }

    #[test]
    fn resolution_selects_key_width() {
        let date = at(2018, 10, 10, 20, 19, 24, 0);
        assert_eq!(
            DateKey::with_resolution(&date, DateKeyResolution::Day).as_str().len(),
            8
        );
        assert_eq!(
            DateKey::with_resolution(&date, DateKeyResolution::Instant)
                .as_str()
                .len(),
            17
        );
    }

    #[test]
    fn parses_platform_and_rfc3339_timestamps() {
        let expected = at(2018, 10, 10, 20, 19, 24, 0);
        assert_eq!(
            parse_timestamp("Wed Oct 10 20:19:24 +0000 2018"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("2018-10-10T22:19:24+02:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn formats_display_date() {
        assert_eq!(
            format_date(&at(2020, 1, 5, 14, 3, 0, 0)),
            "05 Jan, 2020  14:03"
        );
    }
}
