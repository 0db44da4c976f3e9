//! Portal-day calendar: Jakarta-local date strings and the holiday set.
//!
//! The portal renders dates as "D MMM YYYY" (no zero padding, English month
//! abbreviations), and all skip logic compares those strings exactly. Jakarta
//! (WIB) is UTC+7 year-round with no daylight saving, so a fixed offset is
//! sufficient.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Jakarta (WIB) offset from UTC, in seconds.
pub const JAKARTA_OFFSET_SECS: i32 = 7 * 3600;

/// The Jakarta fixed offset.
pub fn jakarta_offset() -> FixedOffset {
    FixedOffset::east_opt(JAKARTA_OFFSET_SECS).expect("UTC+7 is a valid offset")
}

/// Format an instant as the portal's day string in Jakarta local time.
///
/// Stable for any two calls with the same `now`; the workflow computes this
/// once per run and reuses the value.
pub fn portal_day(now: DateTime<Utc>) -> String {
    now.with_timezone(&jakarta_offset())
        .format("%-d %b %Y")
        .to_string()
}

/// Today's portal day string in Jakarta local time.
pub fn today_jakarta() -> String {
    portal_day(Utc::now())
}

/// A set of non-working dates in portal day format.
///
/// Membership is exact string equality against `portal_day` output. The set
/// is supplied externally (TOML file or compiled-in default) rather than
/// embedded in workflow logic, so the calendar can change without a code
/// change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    /// Dates like "25 Dec 2023".
    #[serde(default)]
    dates: HashSet<String>,
}

impl HolidayCalendar {
    /// Build a calendar from an iterator of date strings.
    pub fn from_dates<I, S>(dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dates: dates.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact-match membership test.
    pub fn contains(&self, day: &str) -> bool {
        self.dates.contains(day)
    }

    /// Number of dates in the calendar.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the calendar has no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // -------------------------------------------------------------------
    // portal_day
    // -------------------------------------------------------------------

    #[test]
    fn test_portal_day_no_zero_padding() {
        let now = Utc.with_ymd_and_hms(2023, 6, 5, 8, 0, 0).unwrap();
        assert_eq!(portal_day(now), "5 Jun 2023");
    }

    #[test]
    fn test_portal_day_crosses_midnight_into_jakarta() {
        // 18:30 UTC on Dec 24 is already 01:30 Dec 25 in WIB.
        let now = Utc.with_ymd_and_hms(2023, 12, 24, 18, 30, 0).unwrap();
        assert_eq!(portal_day(now), "25 Dec 2023");
    }

    #[test]
    fn test_portal_day_same_day_before_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2023, 12, 24, 10, 0, 0).unwrap();
        assert_eq!(portal_day(now), "24 Dec 2023");
    }

    #[test]
    fn test_portal_day_is_stable_within_a_run() {
        let now = Utc.with_ymd_and_hms(2023, 6, 15, 1, 0, 0).unwrap();
        assert_eq!(portal_day(now), portal_day(now));
    }

    // -------------------------------------------------------------------
    // HolidayCalendar
    // -------------------------------------------------------------------

    #[test]
    fn test_calendar_exact_match_only() {
        let cal = HolidayCalendar::from_dates(["25 Dec 2023", "26 Dec 2023"]);
        assert!(cal.contains("25 Dec 2023"));
        assert!(!cal.contains("25 Dec 2024"));
        assert!(!cal.contains("25 dec 2023"));
        assert!(!cal.contains(" 25 Dec 2023"));
    }

    #[test]
    fn test_calendar_empty() {
        let cal = HolidayCalendar::default();
        assert!(cal.is_empty());
        assert!(!cal.contains("25 Dec 2023"));
    }

    #[test]
    fn test_calendar_deserializes_from_toml() {
        let cal: HolidayCalendar =
            toml::from_str(r#"dates = ["1 Jan 2024", "17 Aug 2024"]"#).unwrap();
        assert_eq!(cal.len(), 2);
        assert!(cal.contains("17 Aug 2024"));
    }

    #[test]
    fn test_calendar_deserializes_missing_dates_as_empty() {
        let cal: HolidayCalendar = toml::from_str("").unwrap();
        assert!(cal.is_empty());
    }
}
