//! Raw record to [`NormalizedEvent`] conversion.
//!
//! Field conversion is total: missing optional fields become absent and a
//! timestamp that does not parse degrades to an unknown sort key with a
//! warning. Only structural problems surface as [`NormalizationError`],
//! and the batch helpers log and drop those records.
//!
//! The conversion is pure. It reads no clock; the reference instant used
//! for occurrence selection is passed in.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use eventdeck_core::{
    DateEntry, DateFormatter, EventOrigin, EventTimeZone, Keyword, Location, NormalizedEvent,
    Occurrence, Organizer, Price, SearchWindow, select_occurrence,
};
use tracing::{debug, warn};

use crate::error::NormalizationError;
use crate::provider::PrimaryKeywordResolver;
use crate::raw_event::{EventSchedule, RawExternalEvent, RawManualEvent};

/// Label shown instead of the price of a free event.
pub const DEFAULT_FREE_LABEL: &str = "Free";

/// Converts raw records of either source into normalized events.
#[derive(Clone)]
pub struct EventNormalizer {
    formatter: DateFormatter,
    free_label: String,
    keyword_resolver: Option<Arc<dyn PrimaryKeywordResolver>>,
}

impl fmt::Debug for EventNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventNormalizer")
            .field("formatter", &self.formatter)
            .field("free_label", &self.free_label)
            .field("keyword_resolver", &self.keyword_resolver.is_some())
            .finish()
    }
}

impl Default for EventNormalizer {
    fn default() -> Self {
        Self::new(DateFormatter::default())
    }
}

impl EventNormalizer {
    /// Creates a normalizer rendering dates with `formatter`.
    pub fn new(formatter: DateFormatter) -> Self {
        Self {
            formatter,
            free_label: DEFAULT_FREE_LABEL.to_string(),
            keyword_resolver: None,
        }
    }

    /// Builder: set the label used for free events.
    pub fn with_free_label(mut self, label: impl Into<String>) -> Self {
        self.free_label = label.into();
        self
    }

    /// Builder: set the primary keyword lookup for manual events.
    pub fn with_keyword_resolver(mut self, resolver: Arc<dyn PrimaryKeywordResolver>) -> Self {
        self.keyword_resolver = Some(resolver);
        self
    }

    /// Returns the zone timestamps are interpreted in.
    pub fn zone(&self) -> EventTimeZone {
        self.formatter.zone()
    }

    /// Returns the date formatter.
    pub fn formatter(&self) -> &DateFormatter {
        &self.formatter
    }

    /// Converts a manual event.
    ///
    /// For recurring events `active` supplies the sort instants; without it a
    /// recurring event has no sort key. Single-window events always use
    /// their own fields.
    pub fn normalize_manual(
        &self,
        raw: &RawManualEvent,
        active: Option<Occurrence>,
    ) -> NormalizedEvent {
        let (start, end, recurring) = match &raw.schedule {
            EventSchedule::Single {
                start_datetime,
                end_datetime,
            } => {
                let start = self.parse_field(&raw.id, "start_datetime", start_datetime.as_deref());
                let end = self.parse_field(&raw.id, "end_datetime", end_datetime.as_deref());
                let (start, end) = ordered(&raw.id, start, end);
                (start, end, None)
            }
            EventSchedule::Recurring { dates } => {
                let (start, end) = match active {
                    Some(occurrence) => (Some(occurrence.start), Some(occurrence.end)),
                    None => (None, None),
                };
                let recurring = (!dates.is_empty()).then(|| dates.len() > 1);
                (start, end, recurring)
            }
        };

        let mut event = NormalizedEvent::new(&raw.id, EventOrigin::Manual, &raw.title)
            .with_instants(start, end)
            .with_url(&raw.url);

        event.short_description = raw.short_description.clone().unwrap_or_default();
        event.description = raw.description.clone().unwrap_or_default();
        event.display_date = self.formatter.display_date(start, end);
        event.display_time = self.formatter.display_time(start, end);
        event.image = raw.image.clone().filter(|image| !image.is_empty());
        event.is_virtual = raw.is_virtual_event;
        event.virtual_link = raw
            .virtual_event_link
            .as_ref()
            .filter(|link| !link.is_empty())
            .map(|link| link.url.clone());

        event.location = raw.location.as_ref().map(|location| Location {
            name: location.location_name.clone(),
            description: location.location_description.clone(),
            extra_info: location.location_extra_info.clone(),
            info_url: location.location_info_url.clone(),
        });

        event.price = raw.price.as_ref().map(|price| {
            let amount = if raw.price_is_free {
                self.free_label.clone()
            } else {
                price.price_price.clone()
            };
            vec![Price {
                price: amount,
                description: price.price_description.clone(),
                info_url: price.price_info_url.clone(),
            }]
        });

        event.provider = raw.provider.as_ref().map(|provider| Organizer {
            name: provider.provider_name.clone(),
            email: provider.provider_email.clone(),
            phone: provider.provider_phone.clone(),
            link: provider.provider_link.clone(),
        });

        event.recurring = recurring;
        event.occurrences = self
            .parse_occurrences(raw)
            .into_iter()
            .map(|o| DateEntry {
                display_date: self.formatter.occurrence_label(o.start, o.end),
            })
            .collect();

        event.category_keywords = raw.categories.clone();
        event.primary_keyword = self.primary_keyword(&raw.id, &raw.categories);

        event
    }

    /// Converts a manual event for a listing.
    ///
    /// Recurring events are resolved to their active occurrence first;
    /// `Ok(None)` means the event has no occurrence relevant to `now` and
    /// `window`.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError::EmptyRecurrence`] for a recurring event
    /// without a single parseable date range.
    pub fn try_normalize_manual(
        &self,
        raw: &RawManualEvent,
        now: DateTime<Utc>,
        window: Option<&SearchWindow>,
    ) -> Result<Option<NormalizedEvent>, NormalizationError> {
        if !raw.is_recurring() {
            return Ok(Some(self.normalize_manual(raw, None)));
        }

        let occurrences = self.parse_occurrences(raw);
        if occurrences.is_empty() {
            return Err(NormalizationError::EmptyRecurrence { id: raw.id.clone() });
        }

        match select_occurrence(&occurrences, now, window) {
            Some(active) => Ok(Some(self.normalize_manual(raw, Some(active)))),
            None => {
                debug!(event_id = %raw.id, "no relevant occurrence, skipping recurring event");
                Ok(None)
            }
        }
    }

    /// Converts a batch of manual events for a listing, dropping records
    /// that fail or have no relevant occurrence.
    pub fn normalize_manual_events(
        &self,
        raws: &[RawManualEvent],
        now: DateTime<Utc>,
        window: Option<&SearchWindow>,
    ) -> Vec<NormalizedEvent> {
        raws.iter()
            .filter_map(|raw| match self.try_normalize_manual(raw, now, window) {
                Ok(event) => event,
                Err(error) => {
                    warn!(event_id = %raw.id, %error, "dropping manual event");
                    None
                }
            })
            .collect()
    }

    /// Parses every date range of a recurring event in authored order.
    ///
    /// Ranges with an unparseable bound or an end before the start are
    /// skipped with a warning. Single-window events have no ranges.
    pub fn parse_occurrences(&self, raw: &RawManualEvent) -> Vec<Occurrence> {
        let EventSchedule::Recurring { dates } = &raw.schedule else {
            return Vec::new();
        };

        dates
            .iter()
            .filter_map(|range| {
                let start = self.parse_field(&raw.id, "dates.start", Some(&range.start))?;
                let end = self.parse_field(&raw.id, "dates.end", Some(&range.end))?;
                if end < start {
                    warn!(event_id = %raw.id, start = %range.start, end = %range.end,
                        "date range ends before it starts, skipping");
                    return None;
                }
                Some(Occurrence::new(start, end))
            })
            .collect()
    }

    /// Converts an external record.
    pub fn normalize_external(&self, raw: &RawExternalEvent) -> NormalizedEvent {
        let start = self.parse_field(&raw.id, "start", raw.start.as_deref());
        let end = self.parse_field(&raw.id, "end", raw.end.as_deref());
        let (start, end) = ordered(&raw.id, start, end);

        let mut event = NormalizedEvent::new(&raw.id, EventOrigin::External, &raw.name)
            .with_instants(start, end)
            .with_url(&raw.url);

        event.short_description = raw.short_description.clone();
        event.description = raw.description.clone();
        event.display_date = raw
            .date
            .clone()
            .or_else(|| self.formatter.display_date(start, end));
        event.display_time = raw
            .time
            .clone()
            .or_else(|| self.formatter.display_time(start, end));
        event.image = raw.image.clone().filter(|image| !image.is_empty());
        event.is_virtual = raw.is_virtual_event;
        event.virtual_link = raw.virtual_event_link.clone().filter(|link| !link.is_empty());
        event.location = raw.location.clone();
        event.price = raw.price.clone();
        event.provider = raw.provider.clone();
        event.category_keywords = raw.keywords.clone();
        event.primary_keyword = raw
            .primary_keyword
            .clone()
            .or_else(|| raw.keywords.first().cloned());

        event
    }

    /// Converts one untyped record of an external response.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError::InvalidExternalRecord`] if the value is
    /// not an event object.
    pub fn try_normalize_external(
        &self,
        value: serde_json::Value,
    ) -> Result<NormalizedEvent, NormalizationError> {
        let raw: RawExternalEvent = serde_json::from_value(value).map_err(|e| {
            NormalizationError::InvalidExternalRecord {
                reason: e.to_string(),
            }
        })?;
        Ok(self.normalize_external(&raw))
    }

    /// Converts an external response body, dropping malformed records.
    pub fn normalize_external_events(&self, values: Vec<serde_json::Value>) -> Vec<NormalizedEvent> {
        values
            .into_iter()
            .filter_map(|value| match self.try_normalize_external(value) {
                Ok(event) => Some(event),
                Err(error) => {
                    warn!(%error, "dropping external event");
                    None
                }
            })
            .collect()
    }

    /// Picks the primary keyword: the resolver's choice when it names one of
    /// `keywords`, else the first keyword.
    fn primary_keyword(&self, event_id: &str, keywords: &[Keyword]) -> Option<Keyword> {
        let resolved = self
            .keyword_resolver
            .as_ref()
            .and_then(|resolver| resolver.primary_keyword_id(event_id, keywords))
            .and_then(|id| keywords.iter().find(|k| k.id == id));

        resolved.or_else(|| keywords.first()).cloned()
    }

    fn parse_field(
        &self,
        event_id: &str,
        field: &'static str,
        value: Option<&str>,
    ) -> Option<DateTime<Utc>> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        match self.zone().parse(value) {
            Ok(instant) => Some(instant),
            Err(error) => {
                warn!(event_id, field, value, %error, "unparseable event timestamp");
                None
            }
        }
    }
}

/// Drops an end that lies before the start so `start <= end` holds.
fn ordered(
    event_id: &str,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match (start, end) {
        (Some(s), Some(e)) if e < s => {
            warn!(event_id, start = %s, end = %e, "event ends before it starts, ignoring end");
            (Some(s), None)
        }
        other => other,
    }
}
