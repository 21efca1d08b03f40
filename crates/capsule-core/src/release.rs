//! The global release date that gates every capsule.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::{CapsuleError, Result};

/// Built-in release date, in [`RELEASE_DATE_FORMAT`].
pub const DEFAULT_RELEASE_DATE: &str = "2025-Sep-02";

/// Short date format used for the release date (`2025-Sep-02`).
pub const RELEASE_DATE_FORMAT: &str = "%Y-%b-%d";

/// ISO fallback accepted for overrides (`2025-09-02`).
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// The single instant after which capsules may be delivered.
///
/// Releases happen at midnight UTC of the configured day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseSchedule {
    release: DateTime<Utc>,
}

impl ReleaseSchedule {
    /// Create a schedule releasing at the given instant.
    pub fn new(release: DateTime<Utc>) -> Self {
        Self { release }
    }

    /// Parse a release date such as `2025-Sep-02` or `2025-09-02`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let date = NaiveDate::parse_from_str(trimmed, RELEASE_DATE_FORMAT)
            .or_else(|e| NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT).map_err(|_| e))
            .map_err(|source| CapsuleError::InvalidReleaseDate {
                input: input.to_string(),
                source,
            })?;

        Ok(Self::new(date.and_time(NaiveTime::MIN).and_utc()))
    }

    /// The built-in schedule, [`DEFAULT_RELEASE_DATE`].
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_RELEASE_DATE)
    }

    /// The release instant.
    pub fn release(&self) -> DateTime<Utc> {
        self.release
    }

    /// Whether capsules may be delivered at `now`.
    pub fn is_released(&self, now: DateTime<Utc>) -> bool {
        now >= self.release
    }

    /// Whole days left until release, `floor(remaining_hours / 24)`.
    ///
    /// Zero once the release date has passed.
    pub fn remaining_days(&self, now: DateTime<Utc>) -> i64 {
        days_in(self.release - now)
    }

    /// Release date formatted for user-facing messages, e.g. `September 2, 2025`.
    pub fn display_date(&self) -> String {
        self.release.format("%B %-d, %Y").to_string()
    }
}

/// Whole days in a remaining duration, truncated like the hour count.
pub(crate) fn days_in(remaining: chrono::Duration) -> i64 {
    remaining.num_hours().max(0) / 24
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_default_release_date_parses() {
        let schedule = ReleaseSchedule::parse(DEFAULT_RELEASE_DATE).unwrap();
        assert_eq!(schedule.release(), Utc.with_ymd_and_hms(2025, 9, 2, 0, 0, 0).unwrap());
        assert_eq!(ReleaseSchedule::builtin().unwrap(), schedule);
    }

    #[test]
    fn test_parse_iso_fallback() {
        let schedule = ReleaseSchedule::parse("2030-01-15").unwrap();
        assert_eq!(schedule.release(), Utc.with_ymd_and_hms(2030, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = ReleaseSchedule::parse("next tuesday").unwrap_err();
        assert!(matches!(err, CapsuleError::InvalidReleaseDate { ref input, .. } if input == "next tuesday"));
    }

    #[test]
    fn test_remaining_days_floors() {
        let release = Utc.with_ymd_and_hms(2025, 9, 2, 0, 0, 0).unwrap();
        let schedule = ReleaseSchedule::new(release);

        assert_eq!(schedule.remaining_days(release - Duration::hours(47)), 1);
        assert_eq!(schedule.remaining_days(release - Duration::hours(48)), 2);
        assert_eq!(schedule.remaining_days(release - Duration::minutes(30)), 0);
        assert_eq!(schedule.remaining_days(release + Duration::days(3)), 0);
    }

    #[test]
    fn test_remaining_days_scenario() {
        let schedule = ReleaseSchedule::parse("2025-Sep-02").unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(schedule.remaining_days(now), 93);
        assert!(!schedule.is_released(now));
        assert!(schedule.is_released(schedule.release()));
    }

    #[test]
    fn test_display_date() {
        let schedule = ReleaseSchedule::parse("2025-Sep-02").unwrap();
        assert_eq!(schedule.display_date(), "September 2, 2025");
    }
}
