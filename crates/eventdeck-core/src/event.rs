//! Event types shared by every event source.
//!
//! - [`NormalizedEvent`]: the canonical event shape for listing and detail views
//! - [`Link`], [`Location`], [`Price`], [`Organizer`]: optional detail blocks
//! - [`Keyword`]: a category term attached to an event
//!
//! Sorting helpers order events by their start instant with unknown start
//! times pushed to the end.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a normalized event came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOrigin {
    /// Fetched from the external event source.
    #[default]
    External,
    /// Authored in the local content store.
    Manual,
}

/// A titled hyperlink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub title: String,
    pub url: String,
}

impl Link {
    /// Creates a link.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }

    /// Returns true if the link has no URL.
    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

/// Event venue details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub description: String,
    pub extra_info: String,
    pub info_url: Link,
}

/// One price line: an amount or a label such as "Free".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Price {
    pub price: String,
    pub description: String,
    pub info_url: Link,
}

/// The organizer of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organizer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub link: Link,
}

/// A category term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword {
    pub id: u64,
    pub name: String,
}

impl Keyword {
    /// Creates a keyword.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A formatted occurrence of an event, shown in detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateEntry {
    pub display_date: String,
}

/// A normalized event from any source.
///
/// The `start_instant`/`end_instant` pair is only used as a sort and filter
/// key; everything a template shows is already formatted into
/// `display_date`, `display_time` and `occurrences`. When both instants are
/// present, `start_instant <= end_instant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// Source-scoped identifier.
    pub id: String,
    /// Which source produced the event.
    pub origin: EventOrigin,
    pub name: String,
    pub short_description: String,
    pub description: String,
    /// Start of the active occurrence.
    pub start_instant: Option<DateTime<Utc>>,
    /// End of the active occurrence.
    pub end_instant: Option<DateTime<Utc>>,
    pub display_date: Option<String>,
    pub display_time: Option<String>,
    pub image: Option<String>,
    pub url: String,
    pub is_virtual: bool,
    pub virtual_link: Option<String>,
    pub location: Option<Location>,
    pub price: Option<Vec<Price>>,
    pub provider: Option<Organizer>,
    /// `Some(true)` when the source had more than one occurrence.
    pub recurring: Option<bool>,
    /// Every occurrence, formatted, regardless of which one is active.
    pub occurrences: Vec<DateEntry>,
    /// Category terms in the order the source lists them.
    pub category_keywords: Vec<Keyword>,
    pub primary_keyword: Option<Keyword>,
}

impl NormalizedEvent {
    /// Creates an event with the given identity and every optional field empty.
    pub fn new(id: impl Into<String>, origin: EventOrigin, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin,
            name: name.into(),
            short_description: String::new(),
            description: String::new(),
            start_instant: None,
            end_instant: None,
            display_date: None,
            display_time: None,
            image: None,
            url: String::new(),
            is_virtual: false,
            virtual_link: None,
            location: None,
            price: None,
            provider: None,
            recurring: None,
            occurrences: Vec::new(),
            category_keywords: Vec::new(),
            primary_keyword: None,
        }
    }

    /// Builder: set the sort instants.
    pub fn with_instants(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_instant = start;
        self.end_instant = end;
        self
    }

    /// Builder: set the event URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Returns true if the event is a manually authored one.
    pub fn is_manual(&self) -> bool {
        self.origin == EventOrigin::Manual
    }

    /// Returns true if the event is still running or upcoming at `instant`.
    ///
    /// Events without an end fall back to their start; events with neither
    /// are treated as current.
    pub fn ends_at_or_after(&self, instant: DateTime<Utc>) -> bool {
        match self.end_instant.or(self.start_instant) {
            Some(end) => end >= instant,
            None => true,
        }
    }
}

/// Compares two events by start instant, unknown starts last.
pub fn compare_by_start(a: &NormalizedEvent, b: &NormalizedEvent) -> Ordering {
    match (a.start_instant, b.start_instant) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts events ascending by start instant.
///
/// The sort is stable: events with equal keys keep their relative order, and
/// events without a start instant end up after all dated ones.
pub fn sort_by_start(events: &mut [NormalizedEvent]) {
    events.sort_by(compare_by_start);
}
