//! Manual events mixed into an events highlight block.
//!
//! A highlight block already holds external events picked by the editor;
//! matching manual events are merged in, the union is sorted by start and
//! cut to the block's size.

use chrono::{DateTime, NaiveDate, Utc};
use eventdeck_core::{NormalizedEvent, sort_by_start};
use eventdeck_providers::{EventNormalizer, ManualEventQuery, ManualEventRepository};
use tracing::{debug, error};

/// Number of events a highlight block shows by default.
pub const DEFAULT_HIGHLIGHT_COUNT: usize = 10;

/// Options of one highlight block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightLayout {
    /// First start date to include. Unset means today.
    pub start: Option<NaiveDate>,
    /// Ignore `start` and begin today.
    pub starts_today: bool,
    /// Last end date to include.
    pub end: Option<NaiveDate>,
    /// Manual event category filter.
    pub category_ids: Vec<u64>,
    pub text: Option<String>,
    pub count: usize,
}

impl Default for HighlightLayout {
    fn default() -> Self {
        Self {
            start: None,
            starts_today: false,
            end: None,
            category_ids: Vec::new(),
            text: None,
            count: DEFAULT_HIGHLIGHT_COUNT,
        }
    }
}

impl HighlightLayout {
    /// Builder: set the date bounds.
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Builder: begin today regardless of `start`.
    pub fn starting_today(mut self) -> Self {
        self.starts_today = true;
        self
    }

    /// Builder: set the category filter.
    pub fn with_category_ids(mut self, ids: Vec<u64>) -> Self {
        self.category_ids = ids;
        self
    }

    /// Builder: set the search text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: set the block size.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    fn count(&self) -> usize {
        if self.count == 0 {
            DEFAULT_HIGHLIGHT_COUNT
        } else {
            self.count
        }
    }

    /// Returns the manual event query for the block.
    pub fn query(&self, today: NaiveDate) -> ManualEventQuery {
        let start = if self.starts_today {
            today
        } else {
            self.start.unwrap_or(today)
        };

        ManualEventQuery {
            start_from: Some(start),
            end_to: self.end,
            ..Default::default()
        }
        .with_category_ids(self.category_ids.clone())
        .with_text(self.text.clone())
        .with_limit(self.count())
    }
}

/// Merges matching manual events into `external_events`.
///
/// Returns `external_events` untouched when no manual event matches or the
/// repository fails.
pub async fn merge_highlight_events(
    external_events: Vec<NormalizedEvent>,
    layout: &HighlightLayout,
    repository: &dyn ManualEventRepository,
    normalizer: &EventNormalizer,
    now: DateTime<Utc>,
) -> Vec<NormalizedEvent> {
    let today = normalizer.zone().local_date(now);
    let query = layout.query(today);

    let raws = match repository.find_plain_events(&query).await {
        Ok(raws) => raws,
        Err(e) => {
            error!(
                error = %e,
                repository = repository.name(),
                retryable = e.is_retryable(),
                "Failed to load highlight events"
            );
            return external_events;
        }
    };
    if raws.is_empty() {
        debug!("no manual events for highlight block");
        return external_events;
    }

    let manual = normalizer.normalize_manual_events(&raws, now, None);
    debug!(
        external = external_events.len(),
        manual = manual.len(),
        "Merging highlight events"
    );

    let mut events = external_events;
    events.extend(manual);
    sort_by_start(&mut events);
    events.truncate(layout.count());
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::tests::{CountingRepository, date, hel, manual_events, single};
    use eventdeck_core::{EventOrigin, Keyword};

    fn external(id: &str, day: u32) -> NormalizedEvent {
        NormalizedEvent::new(id, EventOrigin::External, id)
            .with_instants(Some(hel(day, 9)), Some(hel(day, 10)))
    }

    fn ids(events: &[NormalizedEvent]) -> Vec<&str> {
        events.iter().map(|e| e.id.as_str()).collect()
    }

    async fn merge(
        external_events: Vec<NormalizedEvent>,
        layout: &HighlightLayout,
        repository: &CountingRepository,
    ) -> Vec<NormalizedEvent> {
        merge_highlight_events(
            external_events,
            layout,
            repository,
            &EventNormalizer::default(),
            hel(5, 12),
        )
        .await
    }

    mod layout_query {
        use super::*;

        #[test]
        fn start_defaults_to_today() {
            let query = HighlightLayout::default().query(date(2, 5));
            assert_eq!(query.start_from, Some(date(2, 5)));
            assert_eq!(query.end_to, None);
            assert_eq!(query.limit, 10);
        }

        #[test]
        fn starts_today_overrides_start() {
            let layout = HighlightLayout::default()
                .with_dates(Some(date(3, 1)), Some(date(3, 31)))
                .starting_today();
            let query = layout.query(date(2, 5));
            assert_eq!(query.start_from, Some(date(2, 5)));
            assert_eq!(query.end_to, Some(date(3, 31)));
        }

        #[test]
        fn zero_count_uses_default() {
            let query = HighlightLayout::default().with_count(0).query(date(2, 5));
            assert_eq!(query.limit, DEFAULT_HIGHLIGHT_COUNT);
        }
    }

    mod merging {
        use super::*;

        #[tokio::test]
        async fn merges_sorts_and_truncates() {
            let repository = CountingRepository::new(manual_events());
            let layout = HighlightLayout::default().with_count(2);
            let events = merge(
                vec![external("ext-b", 9), external("ext-a", 4)],
                &layout,
                &repository,
            )
            .await;

            assert_eq!(ids(&events), vec!["ext-a", "plain"]);
        }

        #[tokio::test]
        async fn no_manual_match_returns_external_unchanged() {
            let repository = CountingRepository::new(manual_events());
            let layout = HighlightLayout::default().with_dates(Some(date(6, 1)), None);
            let external_events = vec![external("ext-b", 9), external("ext-a", 4)];
            let events = merge(external_events.clone(), &layout, &repository).await;

            assert_eq!(events, external_events);
        }

        #[tokio::test]
        async fn category_filter_applies() {
            let tagged = single("tagged", "2025-02-06 18:00:00", "2025-02-06 20:00:00")
                .with_categories(vec![Keyword::new(7, "Music")]);
            let repository = CountingRepository::new(vec![
                tagged,
                single("untagged", "2025-02-06 12:00:00", "2025-02-06 13:00:00"),
            ]);
            let layout = HighlightLayout::default().with_category_ids(vec![7]);
            let events = merge(vec![], &layout, &repository).await;

            assert_eq!(ids(&events), vec!["tagged"]);
        }

        #[tokio::test]
        async fn repository_failure_keeps_external_events() {
            let mut repository = CountingRepository::new(manual_events());
            repository.fail = true;
            let events = merge(
                vec![external("ext-a", 4)],
                &HighlightLayout::default(),
                &repository,
            )
            .await;

            assert_eq!(ids(&events), vec!["ext-a"]);
        }
    }
}
