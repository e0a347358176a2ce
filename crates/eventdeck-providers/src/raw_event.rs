//! Raw event records as they come out of the two sources.
//!
//! - [`RawManualEvent`] is an event authored in the local content store.
//!   Its schedule is an explicit sum type: a single `start`/`end` pair or a
//!   list of discrete date ranges.
//! - [`RawExternalEvent`] is one record of the external source's JSON
//!   response, already in presentation shape apart from its time fields.
//!
//! Timestamps stay strings here; [`crate::normalize`] parses them in the
//! event time zone.

use eventdeck_core::{Keyword, Link, Location, Organizer, Price};
use serde::{Deserialize, Deserializer, Serialize};

/// One authored `[start, end]` pair of a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDateRange {
    pub start: String,
    pub end: String,
}

impl RawDateRange {
    /// Creates a date range from two authored timestamps.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// When a manual event takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventSchedule {
    /// A single window. Either bound may be missing.
    Single {
        start_datetime: Option<String>,
        end_datetime: Option<String>,
    },
    /// Several discrete windows, in authored order.
    Recurring { dates: Vec<RawDateRange> },
}

impl EventSchedule {
    /// Creates a single-window schedule.
    pub fn single(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::Single {
            start_datetime: Some(start.into()),
            end_datetime: Some(end.into()),
        }
    }

    /// Creates a recurring schedule.
    pub fn recurring(dates: Vec<RawDateRange>) -> Self {
        Self::Recurring { dates }
    }
}

/// Authored venue fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLocation {
    pub location_name: String,
    pub location_description: String,
    pub location_extra_info: String,
    pub location_info_url: Link,
}

/// Authored price fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPrice {
    pub price_price: String,
    pub price_description: String,
    pub price_info_url: Link,
}

/// Authored organizer fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProvider {
    pub provider_name: String,
    pub provider_email: String,
    pub provider_phone: String,
    pub provider_link: Link,
}

/// An event authored in the local content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawManualEvent {
    pub id: String,
    pub title: String,
    /// Permalink of the event page.
    pub url: String,
    pub image: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub schedule: EventSchedule,
    pub location: Option<RawLocation>,
    pub price: Option<RawPrice>,
    /// Shows the localized "free" label instead of the price text.
    pub price_is_free: bool,
    pub provider: Option<RawProvider>,
    pub is_virtual_event: bool,
    pub virtual_event_link: Option<Link>,
    /// Category terms in the store's order.
    pub categories: Vec<Keyword>,
}

impl RawManualEvent {
    /// Creates a record with the given identity and schedule; every other
    /// field is empty.
    pub fn new(id: impl Into<String>, title: impl Into<String>, schedule: EventSchedule) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            image: None,
            short_description: None,
            description: None,
            schedule,
            location: None,
            price: None,
            price_is_free: false,
            provider: None,
            is_virtual_event: false,
            virtual_event_link: None,
            categories: Vec::new(),
        }
    }

    /// Builder: set the permalink.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder: set the short description.
    pub fn with_short_description(mut self, text: impl Into<String>) -> Self {
        self.short_description = Some(text.into());
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Builder: set the category terms.
    pub fn with_categories(mut self, categories: Vec<Keyword>) -> Self {
        self.categories = categories;
        self
    }

    /// Returns true if the event uses a list of date ranges.
    pub fn is_recurring(&self) -> bool {
        matches!(self.schedule, EventSchedule::Recurring { .. })
    }

    /// Returns true if the record has the category term `id`.
    pub fn has_category(&self, id: u64) -> bool {
        self.categories.iter().any(|k| k.id == id)
    }
}

/// A manual event in the flat field layout the content store persists.
///
/// `recurring_event` selects which of the two schedule field groups is
/// authoritative; the other group is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManualEventFields {
    pub id: String,
    pub title: String,
    pub url: String,
    pub image: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub start_datetime: Option<String>,
    pub end_datetime: Option<String>,
    pub recurring_event: bool,
    pub dates: Vec<RawDateRange>,
    pub location: Option<RawLocation>,
    pub price: Option<RawPrice>,
    pub price_is_free: bool,
    pub provider: Option<RawProvider>,
    pub is_virtual_event: bool,
    pub virtual_event_link: Option<Link>,
    pub categories: Vec<Keyword>,
}

impl From<ManualEventFields> for RawManualEvent {
    fn from(fields: ManualEventFields) -> Self {
        let schedule = if fields.recurring_event {
            EventSchedule::Recurring {
                dates: fields.dates,
            }
        } else {
            EventSchedule::Single {
                start_datetime: fields.start_datetime,
                end_datetime: fields.end_datetime,
            }
        };

        Self {
            id: fields.id,
            title: fields.title,
            url: fields.url,
            image: fields.image,
            short_description: fields.short_description,
            description: fields.description,
            schedule,
            location: fields.location,
            price: fields.price,
            price_is_free: fields.price_is_free,
            provider: fields.provider,
            is_virtual_event: fields.is_virtual_event,
            virtual_event_link: fields.virtual_event_link,
            categories: fields.categories,
        }
    }
}

/// One record of the external source, in its presentation shape.
///
/// `start`/`end` carry the raw time strings used as sort keys; the
/// formatted `date`/`time` lines, when present, are passed through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawExternalEvent {
    pub id: String,
    pub name: String,
    pub short_description: String,
    pub description: String,
    #[serde(alias = "start_date_raw", alias = "startTime")]
    pub start: Option<String>,
    #[serde(alias = "end_date_raw", alias = "endTime")]
    pub end: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub image: Option<String>,
    pub url: String,
    pub is_virtual_event: bool,
    pub virtual_event_link: Option<String>,
    pub location: Option<Location>,
    pub price: Option<Vec<Price>>,
    pub provider: Option<Organizer>,
    pub keywords: Vec<Keyword>,
    pub primary_keyword: Option<Keyword>,
}

/// The external source's search response.
///
/// Records stay untyped so one malformed record can be dropped without
/// failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalSearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<serde_json::Value>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl ExternalSearchResponse {
    /// Creates a response carrying the given records.
    pub fn with_events(events: Vec<serde_json::Value>) -> Self {
        Self {
            events,
            meta: serde_json::Value::Null,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}
