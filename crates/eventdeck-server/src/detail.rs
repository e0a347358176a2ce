//! Single manual event view.

use eventdeck_core::{Clock, NormalizedEvent};
use eventdeck_providers::{EventNormalizer, NormalizationError, RawManualEvent};
use serde::Serialize;

/// A manual event resolved for its detail page.
///
/// The normalized event carries the active occurrence as its sort instants
/// and every occurrence in `occurrences`; the raw record is kept for fields
/// the listing does not carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDetail {
    pub event: NormalizedEvent,
    pub record: RawManualEvent,
}

impl EventDetail {
    /// Resolves `record` at the clock's current instant.
    ///
    /// Recurring events show the ongoing occurrence, else the next one, else
    /// the last one.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizationError::EmptyRecurrence`] if a recurring event
    /// has no readable date range.
    pub fn resolve(
        record: RawManualEvent,
        clock: &dyn Clock,
        normalizer: &EventNormalizer,
    ) -> Result<Self, NormalizationError> {
        let event = normalizer
            .try_normalize_manual(&record, clock.now(), None)?
            .unwrap_or_else(|| normalizer.normalize_manual(&record, None));
        Ok(Self { event, record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tests::{hel, recurring, single};
    use eventdeck_core::FixedClock;

    fn yoga() -> RawManualEvent {
        recurring(
            "yoga",
            &[
                ("2025-02-05 10:00:00", "2025-02-05 11:00:00"),
                ("2025-02-07 10:00:00", "2025-02-07 11:00:00"),
            ],
        )
    }

    #[test]
    fn shows_next_occurrence_and_all_dates() {
        let clock = FixedClock::new(hel(5, 12));
        let detail = EventDetail::resolve(yoga(), &clock, &EventNormalizer::default()).unwrap();

        assert_eq!(detail.event.start_instant, Some(hel(7, 10)));
        assert_eq!(detail.event.occurrences.len(), 2);
        assert_eq!(detail.event.recurring, Some(true));
        assert_eq!(detail.record.id, "yoga");
    }

    #[test]
    fn shows_ongoing_occurrence() {
        let clock = FixedClock::new(hel(5, 10) + chrono::Duration::minutes(30));
        let detail = EventDetail::resolve(yoga(), &clock, &EventNormalizer::default()).unwrap();
        assert_eq!(detail.event.start_instant, Some(hel(5, 10)));
    }

    #[test]
    fn past_event_falls_back_to_last_occurrence() {
        let clock = FixedClock::new(hel(20, 12));
        let detail = EventDetail::resolve(yoga(), &clock, &EventNormalizer::default()).unwrap();
        assert_eq!(detail.event.start_instant, Some(hel(7, 10)));
    }

    #[test]
    fn single_event_uses_its_own_dates() {
        let clock = FixedClock::new(hel(20, 12));
        let record = single("plain", "2025-02-05 14:00:00", "2025-02-05 16:00:00");
        let detail = EventDetail::resolve(record, &clock, &EventNormalizer::default()).unwrap();
        assert_eq!(detail.event.start_instant, Some(hel(5, 14)));
        assert_eq!(detail.event.end_instant, Some(hel(5, 16)));
    }

    #[test]
    fn unreadable_recurrence_is_an_error() {
        let clock = FixedClock::new(hel(5, 12));
        let record = recurring("broken", &[("someday", "later")]);
        let err = EventDetail::resolve(record, &clock, &EventNormalizer::default()).unwrap_err();
        assert!(matches!(err, NormalizationError::EmptyRecurrence { .. }));
    }
}
