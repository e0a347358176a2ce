//! Merged event listings.
//!
//! [`EventAggregator`] combines the external source with the manual event
//! store:
//!
//! 1. derive the cache key from the canonical query and look it up in the
//!    page's cache group
//! 2. on a miss, fetch external results, plain manual events and recurring
//!    manual events concurrently
//! 3. normalize every record, resolving each recurring event to its active
//!    occurrence
//! 4. merge, sort by start instant and cache the full list
//!
//! Pagination is applied by the caller on the returned list.

use std::sync::Arc;

use chrono::{DateTime, Months, NaiveDate, Utc};
use eventdeck_core::{
    Clock, EventTimeZone, NormalizedEvent, SearchWindow, SystemClock, sort_by_start,
};
use eventdeck_providers::{
    EventNormalizer, ExternalEventSource, ManualEventQuery, ManualEventRepository, QueryParams,
};
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::config::AggregatorConfig;
use crate::error::{AggregatorError, AggregatorResult, CacheError, ConfigError};
use crate::query::{SearchFlags, cache_key};

/// Which page a listing is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// Upcoming events, no search window.
    List,
    /// A search bounded by the query's date window.
    Search(SearchFlags),
}

/// Builds merged listings from the external source and the manual store.
pub struct EventAggregator {
    config: AggregatorConfig,
    external: Arc<dyn ExternalEventSource>,
    repository: Arc<dyn ManualEventRepository>,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    normalizer: EventNormalizer,
}

impl EventAggregator {
    /// Creates an aggregator reading the system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(
        config: AggregatorConfig,
        external: Arc<dyn ExternalEventSource>,
        repository: Arc<dyn ManualEventRepository>,
        cache: Arc<dyn CacheStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let normalizer = EventNormalizer::new(config.formatter());
        Ok(Self {
            config,
            external,
            repository,
            cache,
            clock: Arc::new(SystemClock),
            normalizer,
        })
    }

    /// Builder: set the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builder: replace the normalizer, e.g. to add a keyword resolver.
    pub fn with_normalizer(mut self, normalizer: EventNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &EventNormalizer {
        &self.normalizer
    }

    pub fn repository(&self) -> &Arc<dyn ManualEventRepository> {
        &self.repository
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns the event time zone.
    pub fn zone(&self) -> EventTimeZone {
        self.config.event_time_zone()
    }

    /// Returns the current instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Returns today's date in the event time zone.
    pub fn today(&self) -> NaiveDate {
        self.zone().local_date(self.clock.now())
    }

    /// Returns the merged, sorted listing for `params`.
    ///
    /// In search mode a query with no text and no typed dates yields an
    /// empty list without touching any collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error if the external source or the manual store fails.
    /// Cache failures are logged and never returned.
    pub async fn get_events(
        &self,
        params: &QueryParams,
        mode: AggregationMode,
    ) -> AggregatorResult<Vec<NormalizedEvent>> {
        let (group, flags) = match mode {
            AggregationMode::List => (self.config.list_cache_group.as_str(), None),
            AggregationMode::Search(flags) => {
                if params.search_text().is_none() && !flags.explicit_start && !flags.explicit_end
                {
                    debug!("search without text or dates, returning no events");
                    return Ok(Vec::new());
                }
                (self.config.search_cache_group.as_str(), Some(flags))
            }
        };

        let key = cache_key(params, flags);
        if let Some(events) = self.read_cache(group, &key) {
            debug!(group, key = %key, count = events.len(), "Cache hit");
            return Ok(events);
        }
        debug!(group, key = %key, "Cache miss");

        let events = self.collect(&params.canonical(), mode).await?;
        self.write_cache(group, &key, &events);
        Ok(events)
    }

    async fn collect(
        &self,
        params: &QueryParams,
        mode: AggregationMode,
    ) -> AggregatorResult<Vec<NormalizedEvent>> {
        let now = self.clock.now();
        let zone = self.zone();
        let today = zone.local_date(now);
        let plan = self.plan(params, mode, today);

        let (response, plain, recurring) = tokio::try_join!(
            async {
                self.external
                    .search(params)
                    .await
                    .map_err(AggregatorError::ExternalSource)
            },
            async {
                self.repository
                    .find_plain_events(&plan.plain)
                    .await
                    .map_err(AggregatorError::Repository)
            },
            async {
                self.repository
                    .find_recurring_events(&plan.recurring)
                    .await
                    .map_err(AggregatorError::Repository)
            },
        )?;

        let external = self.normalizer.normalize_external_events(response.events);
        let plain = self
            .normalizer
            .normalize_manual_events(&plain, now, plan.window.as_ref());
        let mut recurring =
            self.normalizer
                .normalize_manual_events(&recurring, now, plan.window.as_ref());

        if plan.window.is_none() {
            // The resolver falls back to the last occurrence; listings only
            // show events still running today.
            let start_of_today = zone.start_of_day(today);
            recurring.retain(|event| event.ends_at_or_after(start_of_today));
        }

        info!(
            external = external.len(),
            plain = plain.len(),
            recurring = recurring.len(),
            "Merged event sources"
        );

        let mut events: Vec<NormalizedEvent> =
            external.into_iter().chain(plain).chain(recurring).collect();
        sort_by_start(&mut events);
        Ok(events)
    }

    fn plan(&self, params: &QueryParams, mode: AggregationMode, today: NaiveDate) -> FetchPlan {
        let limit = self.config.manual_event_limit;
        match mode {
            AggregationMode::List => FetchPlan {
                plain: ManualEventQuery::ending_from(today).with_limit(limit),
                recurring: ManualEventQuery::default().with_limit(limit),
                window: None,
            },
            AggregationMode::Search(flags) => {
                let start = params.start.unwrap_or(today);
                let end = params.end.unwrap_or_else(|| one_year_after(start));
                let text = params.search_text().map(str::to_string);

                let plain = if flags.explicit_start {
                    ManualEventQuery {
                        start_from: Some(start),
                        end_to: Some(end),
                        ..Default::default()
                    }
                } else {
                    ManualEventQuery {
                        end_from: Some(start),
                        end_to: Some(end),
                        ..Default::default()
                    }
                };

                let zone = self.zone();
                FetchPlan {
                    plain: plain.with_text(text.clone()).with_limit(limit),
                    recurring: ManualEventQuery::default()
                        .with_text(text)
                        .with_limit(limit),
                    window: Some(SearchWindow::new(
                        zone.start_of_day(start),
                        zone.end_of_day(end),
                        flags.explicit_start,
                    )),
                }
            }
        }
    }

    fn read_cache(&self, group: &str, key: &str) -> Option<Vec<NormalizedEvent>> {
        let bytes = match self.cache.get(group, key) {
            Ok(bytes) => bytes?,
            Err(error) => {
                warn!(%error, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(events) => Some(events),
            Err(e) => {
                let error = CacheError::Decode(e);
                warn!(%error, group, key, "Discarding cached payload");
                None
            }
        }
    }

    fn write_cache(&self, group: &str, key: &str, events: &[NormalizedEvent]) {
        let payload = match serde_json::to_vec(events) {
            Ok(payload) => payload,
            Err(e) => {
                let error = CacheError::Encode(e);
                warn!(%error, "Skipping cache write");
                return;
            }
        };

        if let Err(error) = self.cache.set(group, key, payload, self.config.cache_ttl) {
            warn!(%error, "Cache write failed");
        }
    }
}

/// The two manual event queries and the occurrence window of one request.
struct FetchPlan {
    plain: ManualEventQuery,
    recurring: ManualEventQuery,
    window: Option<SearchWindow>,
}

/// Default end of a search window.
pub fn one_year_after(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX)
}
