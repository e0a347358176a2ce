//! Time zone and clock types for event scheduling.
//!
//! Manual events are authored as wall-clock timestamps without an offset.
//! [`EventTimeZone`] anchors them to one fixed zone so sorting and filtering
//! compare real instants, and [`Clock`] supplies "now" so every date
//! comparison in a request sees the same reference instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// The zone manual events are authored in unless configured otherwise.
pub const DEFAULT_EVENT_TIME_ZONE: Tz = chrono_tz::Europe::Helsinki;

/// Wall-clock formats accepted for authored timestamps, most specific first.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Errors produced while interpreting authored timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// The timestamp field was empty.
    #[error("empty timestamp")]
    Empty,

    /// The value did not match any supported timestamp format.
    #[error("unrecognized timestamp: {0:?}")]
    Format(String),

    /// The wall-clock time falls into a DST gap of the event zone.
    #[error("local time {value} does not exist in {zone}")]
    Nonexistent { value: String, zone: Tz },

    /// The configured zone name is not an IANA identifier.
    #[error("unknown time zone: {0}")]
    UnknownZone(String),
}

/// The fixed time zone in which event timestamps are interpreted and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTimeZone {
    tz: Tz,
}

impl Default for EventTimeZone {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_TIME_ZONE)
    }
}

impl EventTimeZone {
    /// Creates an event time zone from a `chrono-tz` zone.
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Looks up a zone by IANA name (e.g. `Europe/Helsinki`).
    pub fn from_name(name: &str) -> Result<Self, TimeError> {
        name.trim()
            .parse::<Tz>()
            .map(Self::new)
            .map_err(|_| TimeError::UnknownZone(name.to_string()))
    }

    /// Returns the underlying zone.
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Parses an authored timestamp into an instant.
    ///
    /// Accepts RFC 3339 (the offset is honoured), `YYYY-MM-DD HH:MM[:SS]`
    /// wall-clock time in this zone, and a bare `YYYY-MM-DD` meaning local
    /// midnight. Ambiguous wall-clock times resolve to the earlier instant.
    pub fn parse(&self, value: &str) -> Result<DateTime<Utc>, TimeError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(TimeError::Empty);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.with_timezone(&Utc));
        }

        let naive = NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
            .ok_or_else(|| TimeError::Format(value.to_string()))?;

        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| TimeError::Nonexistent {
                value: value.to_string(),
                zone: self.tz,
            })
    }

    /// Converts an instant into this zone.
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// Returns the calendar date of an instant in this zone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.to_local(instant).date_naive()
    }

    /// Returns the instant at which `date` begins in this zone.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.tz.from_local_datetime(&midnight).earliest() {
            Some(dt) => dt.with_timezone(&Utc),
            // Midnight skipped by a DST change: use the same offset as the UTC reading.
            None => self.tz.from_utc_datetime(&midnight).with_timezone(&Utc),
        }
    }

    /// Returns the instant at which `date` ends (start of the following day).
    pub fn end_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        match date.succ_opt() {
            Some(next) => self.start_of_day(next),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Creates a clock that always returns `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
