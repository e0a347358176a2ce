//! In-memory manual event repository.
//!
//! Holds records loaded from a JSON export of the content store and answers
//! [`ManualEventQuery`] filters the way the store would: date bounds compare
//! calendar dates in the event time zone, records whose dates cannot be read
//! never match a date bound.

use chrono::NaiveDate;
use eventdeck_core::EventTimeZone;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, ManualEventRepository};
use crate::query::ManualEventQuery;
use crate::raw_event::{EventSchedule, ManualEventFields, RawManualEvent};

/// Manual events held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryManualEvents {
    events: Vec<RawManualEvent>,
    zone: EventTimeZone,
}

impl InMemoryManualEvents {
    /// Creates a repository over `events`.
    pub fn new(events: Vec<RawManualEvent>, zone: EventTimeZone) -> Self {
        Self { events, zone }
    }

    /// Parses a JSON array of stored field records.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the document is not an array of records.
    pub fn from_json(json: &str, zone: EventTimeZone) -> ProviderResult<Self> {
        let fields: Vec<ManualEventFields> = serde_json::from_str(json).map_err(|e| {
            ProviderError::storage(format!("failed to parse manual events: {e}"))
                .with_provider("memory")
                .with_source(e)
        })?;
        let events = fields.into_iter().map(RawManualEvent::from).collect();
        Ok(Self::new(events, zone))
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the repository holds no records.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Looks up a record by id.
    pub fn get(&self, id: &str) -> Option<&RawManualEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    fn local_date(&self, value: Option<&str>) -> Option<NaiveDate> {
        let instant = self.zone.parse(value?).ok()?;
        Some(self.zone.local_date(instant))
    }

    fn matches_dates(&self, event: &RawManualEvent, query: &ManualEventQuery) -> bool {
        let EventSchedule::Single {
            start_datetime,
            end_datetime,
        } = &event.schedule
        else {
            return false;
        };

        self.date_within(end_datetime.as_deref(), query.end_from, query.end_to)
            && self.date_within(start_datetime.as_deref(), query.start_from, None)
    }

    fn date_within(
        &self,
        value: Option<&str>,
        lower: Option<NaiveDate>,
        upper: Option<NaiveDate>,
    ) -> bool {
        if lower.is_none() && upper.is_none() {
            return true;
        }
        let Some(date) = self.local_date(value) else {
            return false;
        };
        lower.is_none_or(|d| date >= d) && upper.is_none_or(|d| date <= d)
    }

    fn select<'a>(
        &'a self,
        query: &'a ManualEventQuery,
        recurring: bool,
    ) -> impl Iterator<Item = RawManualEvent> + 'a {
        let text = query.text.as_deref().map(str::to_lowercase);
        self.events
            .iter()
            .filter(move |e| e.is_recurring() == recurring)
            .filter(move |e| recurring || self.matches_dates(e, query))
            .filter(move |e| {
                query.category_ids.is_empty()
                    || query.category_ids.iter().any(|id| e.has_category(*id))
            })
            .filter(move |e| text.as_deref().is_none_or(|text| matches_text(e, text)))
            .take(query.limit)
            .cloned()
    }
}

/// Case-insensitive substring match on the title and both descriptions.
fn matches_text(event: &RawManualEvent, needle: &str) -> bool {
    let needle = needle.trim();
    [
        Some(event.title.as_str()),
        event.short_description.as_deref(),
        event.description.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|haystack| haystack.to_lowercase().contains(needle))
}

impl ManualEventRepository for InMemoryManualEvents {
    fn name(&self) -> &str {
        "memory"
    }

    fn find_plain_events<'a>(
        &'a self,
        query: &'a ManualEventQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawManualEvent>>> {
        Box::pin(async move {
            let events: Vec<_> = self.select(query, false).collect();
            debug!(count = events.len(), "found plain manual events");
            Ok(events)
        })
    }

    fn find_recurring_events<'a>(
        &'a self,
        query: &'a ManualEventQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawManualEvent>>> {
        Box::pin(async move {
            let events: Vec<_> = self.select(query, true).collect();
            debug!(count = events.len(), "found recurring manual events");
            Ok(events)
        })
    }
}
