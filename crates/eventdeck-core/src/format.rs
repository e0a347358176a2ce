//! Display formatting for event dates and times.
//!
//! All strings are rendered in the event time zone using `strftime`-style
//! patterns from [`DisplayFormat`].

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::time::EventTimeZone;

/// A `strftime` pattern that chrono cannot render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} format: {pattern:?}")]
pub struct FormatError {
    pub field: &'static str,
    pub pattern: String,
}

/// Patterns used to render dates and times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    /// Calendar date, e.g. `5.2.2025`.
    pub date: String,
    /// Time of day, e.g. `10.00`.
    pub time: String,
    /// Date and time together for occurrence lists, e.g. `5.2.2025 10.00`.
    pub occurrence: String,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            date: "%-d.%-m.%Y".to_string(),
            time: "%H.%M".to_string(),
            occurrence: "%-d.%-m.%Y %H.%M".to_string(),
        }
    }
}

impl DisplayFormat {
    /// Checks every pattern up front; rendering an invalid one would panic.
    pub fn validate(&self) -> Result<(), FormatError> {
        for (field, pattern) in [
            ("date", &self.date),
            ("time", &self.time),
            ("occurrence", &self.occurrence),
        ] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(FormatError {
                    field,
                    pattern: pattern.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Renders instants for display in one zone.
#[derive(Debug, Clone, Default)]
pub struct DateFormatter {
    zone: EventTimeZone,
    format: DisplayFormat,
}

impl DateFormatter {
    /// Creates a formatter. Patterns are expected to have been validated.
    pub fn new(zone: EventTimeZone, format: DisplayFormat) -> Self {
        Self { zone, format }
    }

    /// Returns the zone used for rendering.
    pub fn zone(&self) -> EventTimeZone {
        self.zone
    }

    fn render(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        self.zone.to_local(instant).format(pattern).to_string()
    }

    /// Formats the date line: a range when the event lasts a day or more.
    ///
    /// Returns `None` when the start is unknown.
    pub fn display_date(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<String> {
        let start = start?;
        let date = match end {
            Some(end) if self.spans_days(start, end) => format!(
                "{} - {}",
                self.render(start, &self.format.date),
                self.render(end, &self.format.date)
            ),
            _ => self.render(start, &self.format.date),
        };
        Some(date)
    }

    /// Formats the time line: `start - end`, or just the start time.
    ///
    /// Returns `None` when the start is unknown.
    pub fn display_time(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<String> {
        let start = start?;
        let time = match end {
            Some(end) => format!(
                "{} - {}",
                self.render(start, &self.format.time),
                self.render(end, &self.format.time)
            ),
            None => self.render(start, &self.format.time),
        };
        Some(time)
    }

    /// Formats one occurrence for the detail view's date list.
    ///
    /// Same-day occurrences print the end as time only.
    pub fn occurrence_label(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        let end_pattern = if self.spans_days(start, end) {
            &self.format.occurrence
        } else {
            &self.format.time
        };
        format!(
            "{} - {}",
            self.render(start, &self.format.occurrence),
            self.render(end, end_pattern)
        )
    }

    /// True when at least one full day of wall-clock time in the zone
    /// separates the two instants.
    fn spans_days(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let start = self.zone.to_local(start).naive_local();
        let end = self.zone.to_local(end).naive_local();
        (end - start).num_days().abs() >= 1
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Wall-clock time in Helsinki during winter (UTC+2).
    fn hel(d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, d, h, min, 0).unwrap() - Duration::hours(2)
    }

    fn formatter() -> DateFormatter {
        DateFormatter::default()
    }

    #[test]
    fn default_patterns_are_valid() {
        assert!(DisplayFormat::default().validate().is_ok());
    }

    #[test]
    fn rejects_invalid_pattern() {
        let format = DisplayFormat {
            time: "%Q".to_string(),
            ..Default::default()
        };
        let err = format.validate().unwrap_err();
        assert_eq!(err.field, "time");
    }

    mod dates {
        use super::*;

        #[test]
        fn same_day_event_shows_single_date() {
            let f = formatter();
            assert_eq!(
                f.display_date(Some(hel(5, 10, 0)), Some(hel(5, 12, 0))),
                Some("5.2.2025".to_string())
            );
        }

        #[test]
        fn multi_day_event_shows_range() {
            let f = formatter();
            assert_eq!(
                f.display_date(Some(hel(5, 10, 0)), Some(hel(7, 12, 0))),
                Some("5.2.2025 - 7.2.2025".to_string())
            );
        }

        #[test]
        fn overnight_under_a_day_shows_single_date() {
            let f = formatter();
            assert_eq!(
                f.display_date(Some(hel(5, 20, 0)), Some(hel(6, 2, 0))),
                Some("5.2.2025".to_string())
            );
        }

        #[test]
        fn missing_start_yields_none() {
            let f = formatter();
            assert_eq!(f.display_date(None, Some(hel(5, 12, 0))), None);
            assert_eq!(f.display_time(None, Some(hel(5, 12, 0))), None);
        }

        #[test]
        fn missing_end_shows_start_only() {
            let f = formatter();
            assert_eq!(
                f.display_date(Some(hel(5, 10, 0)), None),
                Some("5.2.2025".to_string())
            );
        }
    }

    mod daylight_saving {
        use super::*;

        fn local(value: &str) -> DateTime<Utc> {
            EventTimeZone::default().parse(value).unwrap()
        }

        #[test]
        fn spring_forward_day_still_spans_two_dates() {
            // Clocks go forward on 30.3.2025: 23 hours elapse.
            let f = formatter();
            assert_eq!(
                f.display_date(
                    Some(local("2025-03-29 10:00:00")),
                    Some(local("2025-03-30 10:00:00"))
                ),
                Some("29.3.2025 - 30.3.2025".to_string())
            );
        }

        #[test]
        fn fall_back_night_under_a_day_is_single_date() {
            // Clocks go back on 26.10.2025: 24 hours elapse by 09:00.
            let f = formatter();
            assert_eq!(
                f.display_date(
                    Some(local("2025-10-25 10:00:00")),
                    Some(local("2025-10-26 09:00:00"))
                ),
                Some("25.10.2025".to_string())
            );
        }

        #[test]
        fn spring_forward_occurrence_prints_end_date() {
            let f = formatter();
            assert_eq!(
                f.occurrence_label(local("2025-03-29 10:00:00"), local("2025-03-30 10:00:00")),
                "29.3.2025 10.00 - 30.3.2025 10.00"
            );
        }
    }

    mod times {
        use super::*;

        #[test]
        fn shows_range() {
            let f = formatter();
            assert_eq!(
                f.display_time(Some(hel(5, 9, 5)), Some(hel(5, 17, 30))),
                Some("09.05 - 17.30".to_string())
            );
        }

        #[test]
        fn shows_start_only() {
            let f = formatter();
            assert_eq!(
                f.display_time(Some(hel(5, 9, 5)), None),
                Some("09.05".to_string())
            );
        }
    }

    mod occurrences {
        use super::*;

        #[test]
        fn same_day_occurrence() {
            let f = formatter();
            assert_eq!(
                f.occurrence_label(hel(5, 10, 0), hel(5, 11, 0)),
                "5.2.2025 10.00 - 11.00"
            );
        }

        #[test]
        fn multi_day_occurrence() {
            let f = formatter();
            assert_eq!(
                f.occurrence_label(hel(5, 10, 0), hel(7, 11, 0)),
                "5.2.2025 10.00 - 7.2.2025 11.00"
            );
        }
    }
}
