//! Core types: time zone, normalized events, occurrences, pagination, formatting

pub mod event;
pub mod format;
pub mod occurrence;
pub mod pagination;
pub mod time;
pub mod tracing;

pub use event::{
    DateEntry, EventOrigin, Keyword, Link, Location, NormalizedEvent, Organizer, Price,
    compare_by_start, sort_by_start,
};
pub use format::{DateFormatter, DisplayFormat, FormatError};
pub use occurrence::{Occurrence, SearchWindow, select_occurrence};
pub use pagination::{MAX_EVENTS_PER_PAGE, Pagination, effective_per_page, skip_for, slice};
pub use time::{Clock, DEFAULT_EVENT_TIME_ZONE, EventTimeZone, FixedClock, SystemClock, TimeError};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
