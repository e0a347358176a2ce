//! Event page commands.
//!
//! Wires the aggregator to the configured sources and renders page models
//! as JSON.

use std::path::Path;
use std::sync::Arc;

use eventdeck_core::{Clock, NormalizedEvent};
#[cfg(feature = "http")]
use eventdeck_providers::HttpEventSource;
use eventdeck_providers::{
    EmptyEventSource, EventNormalizer, ExternalEventSource, InMemoryManualEvents, QueryParams,
};
use eventdeck_server::{
    CombinedEventsList, CombinedEventsSearch, EventAggregator, EventDetail, HighlightLayout,
    MemoryCache, PageEvents, PageSettings, SearchForm, SearchInput, merge_highlight_events,
};
use serde::Serialize;
use tracing::{debug, error, info};
#[cfg(not(feature = "http"))]
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Output of the `list` command.
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub description: Option<String>,
    pub no_results: String,
    #[serde(flatten)]
    pub page: PageEvents,
}

/// Output of the `search` command.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub description: Option<String>,
    pub no_results: String,
    pub form: SearchForm,
    #[serde(flatten)]
    pub page: PageEvents,
}

/// Loads the manual events file, or an empty store when none is configured.
///
/// `path` takes precedence over `manual_events_path` in the configuration.
pub fn load_manual_events(
    path: Option<&Path>,
    config: &ClientConfig,
) -> ClientResult<InMemoryManualEvents> {
    let zone = config.events.event_time_zone()?;
    let Some(path) = path.or(config.manual_events_path.as_deref()) else {
        info!("No manual events file configured");
        return Ok(InMemoryManualEvents::new(Vec::new(), zone));
    };

    let content = std::fs::read_to_string(path)?;
    let events = InMemoryManualEvents::from_json(&content, zone)?;
    debug!(path = %path.display(), count = events.len(), "Loaded manual events");
    Ok(events)
}

/// Builds the external source from `base_url`, else the configuration.
pub fn external_source(
    base_url: Option<&str>,
    config: &ClientConfig,
) -> ClientResult<Arc<dyn ExternalEventSource>> {
    match base_url.or(config.external.base_url.as_deref()) {
        #[cfg(feature = "http")]
        Some(url) => {
            let source = HttpEventSource::new(url, config.external.timeout())?;
            info!(endpoint = %source.endpoint(), "Using external event API");
            Ok(Arc::new(source))
        }
        #[cfg(not(feature = "http"))]
        Some(url) => {
            warn!(url, "Built without http support, external events disabled");
            Ok(Arc::new(EmptyEventSource))
        }
        None => {
            info!("No external endpoint configured");
            Ok(Arc::new(EmptyEventSource))
        }
    }
}

/// The sources and aggregator of one invocation.
pub struct Runtime {
    aggregator: EventAggregator,
    source: Arc<dyn ExternalEventSource>,
    manual: Arc<InMemoryManualEvents>,
    settings: PageSettings,
}

impl Runtime {
    /// Builds the runtime over the given sources.
    pub fn new(
        config: &ClientConfig,
        source: Arc<dyn ExternalEventSource>,
        manual: InMemoryManualEvents,
    ) -> ClientResult<Self> {
        let aggregator_config = config.events.to_aggregator_config()?;
        let normalizer = EventNormalizer::new(aggregator_config.formatter())
            .with_free_label(config.events.free_label.clone());
        let manual = Arc::new(manual);

        let aggregator = EventAggregator::new(
            aggregator_config,
            source.clone(),
            manual.clone(),
            Arc::new(MemoryCache::new()),
        )?
        .with_normalizer(normalizer);

        Ok(Self {
            aggregator,
            source,
            manual,
            settings: config.page.to_page_settings(),
        })
    }

    /// Builder: set the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.aggregator = self.aggregator.with_clock(clock);
        self
    }

    /// Renders `page` of the combined list.
    pub async fn list(&self, page: usize, categories: Vec<String>) -> ListOutput {
        let mut settings = self.settings.clone();
        if !categories.is_empty() {
            settings.category_ids = categories;
        }

        let list = CombinedEventsList::new(&self.aggregator, settings, page);
        ListOutput {
            description: list.description().map(str::to_string),
            no_results: list.no_results().to_string(),
            page: list.events().await,
        }
    }

    /// Renders `page` of a search.
    pub async fn search(&self, input: SearchInput, page: usize) -> SearchOutput {
        let search = CombinedEventsSearch::new(&self.aggregator, self.settings.clone(), input, page);
        SearchOutput {
            description: search.description().map(str::to_string),
            no_results: search.no_results().to_string(),
            form: search.form(),
            page: search.events().await,
        }
    }

    /// Resolves one manual event.
    pub fn show(&self, id: &str) -> ClientResult<EventDetail> {
        let record = self
            .manual
            .get(id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
        Ok(EventDetail::resolve(
            record,
            self.aggregator.clock(),
            self.aggregator.normalizer(),
        )?)
    }

    /// Merges manual events into the external events of a highlight block.
    pub async fn highlight(&self, layout: &HighlightLayout) -> Vec<NormalizedEvent> {
        let today = self.aggregator.today();
        let params = QueryParams {
            text: layout.text.clone(),
            start: Some(if layout.starts_today {
                today
            } else {
                layout.start.unwrap_or(today)
            }),
            end: layout.end,
            size: Some(layout.count),
            ..QueryParams::default()
        };

        let external = match self.source.search(&params).await {
            Ok(response) => self
                .aggregator
                .normalizer()
                .normalize_external_events(response.events),
            Err(e) => {
                error!(error = %e, source = self.source.name(), "Failed to load highlight events");
                Vec::new()
            }
        };

        merge_highlight_events(
            external,
            layout,
            self.manual.as_ref(),
            self.aggregator.normalizer(),
            self.aggregator.now(),
        )
        .await
    }
}

/// Pretty-prints `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use eventdeck_core::FixedClock;
    use eventdeck_providers::{ErrorEventSource, ProviderError};
    use std::io::Write;

    const MANUAL_EVENTS: &str = r#"[
        {"id": "choir", "title": "Choir concert",
         "start_datetime": "2025-02-05 14:00:00", "end_datetime": "2025-02-05 16:00:00",
         "price": {"price_price": "10 EUR"}, "price_is_free": true},
        {"id": "yoga", "title": "Morning yoga", "recurring_event": true,
         "dates": [
            {"start": "2025-02-05 08:00:00", "end": "2025-02-05 09:00:00"},
            {"start": "2025-02-12 08:00:00", "end": "2025-02-12 09:00:00"}
         ]}
    ]"#;

    fn config() -> ClientConfig {
        let mut config = ClientConfig::default();
        config.events.free_label = "Maksuton".to_string();
        config.page.posts_per_page = 1;
        config
    }

    fn runtime(source: Arc<dyn ExternalEventSource>) -> Runtime {
        let manual =
            InMemoryManualEvents::from_json(MANUAL_EVENTS, config().events.event_time_zone().unwrap())
                .unwrap();
        Runtime::new(&config(), source, manual)
            .unwrap()
            .with_clock(Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2025, 2, 5, 10, 0, 0).unwrap(),
            )))
    }

    mod sources {
        use super::*;

        #[test]
        fn loads_manual_events_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(MANUAL_EVENTS.as_bytes()).unwrap();
            let events = load_manual_events(Some(file.path()), &ClientConfig::default()).unwrap();
            assert_eq!(events.len(), 2);
        }

        #[test]
        fn no_file_means_no_manual_events() {
            let events = load_manual_events(None, &ClientConfig::default()).unwrap();
            assert!(events.is_empty());
        }

        #[test]
        fn missing_file_is_an_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("events.json");
            assert!(matches!(
                load_manual_events(Some(&path), &ClientConfig::default()),
                Err(ClientError::Io(_))
            ));
        }

        #[test]
        fn malformed_file_is_a_provider_error() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(b"{}").unwrap();
            assert!(matches!(
                load_manual_events(Some(file.path()), &ClientConfig::default()),
                Err(ClientError::Provider(_))
            ));
        }

        #[test]
        fn no_endpoint_means_empty_source() {
            let source = external_source(None, &ClientConfig::default()).unwrap();
            assert_eq!(source.name(), "empty");
        }

        #[cfg(feature = "http")]
        #[test]
        fn invalid_endpoint_is_an_error() {
            assert!(matches!(
                external_source(Some("ftp://example.com"), &ClientConfig::default()),
                Err(ClientError::Provider(_))
            ));
        }
    }

    mod pages {
        use super::*;

        #[tokio::test]
        async fn list_pages_through_manual_events() {
            let runtime = runtime(Arc::new(EmptyEventSource));

            let first = runtime.list(1, Vec::new()).await;
            assert_eq!(first.page.pagination.total_items, 2);
            assert_eq!(first.page.events[0].id, "choir");
            assert_eq!(
                first.page.events[0].price.as_ref().unwrap()[0].price,
                "Maksuton"
            );

            let second = runtime.list(2, Vec::new()).await;
            assert_eq!(second.page.events[0].id, "yoga");
        }

        #[tokio::test]
        async fn failing_source_renders_no_results() {
            let runtime = runtime(Arc::new(ErrorEventSource::new(
                "api",
                ProviderError::network("connection refused"),
            )));
            let output = runtime.list(1, Vec::new()).await;

            assert!(output.page.events.is_empty());
            assert_eq!(output.no_results, "No results");
        }

        #[tokio::test]
        async fn search_echoes_the_form() {
            let runtime = runtime(Arc::new(EmptyEventSource));
            let output = runtime
                .search(
                    SearchInput {
                        text: Some(" yoga ".into()),
                        ..Default::default()
                    },
                    1,
                )
                .await;

            assert_eq!(output.form.search_term, "yoga");
            assert_eq!(output.page.events.len(), 1);
            assert_eq!(output.page.events[0].id, "yoga");
        }

        #[tokio::test]
        async fn output_serializes_flat() {
            let runtime = runtime(Arc::new(EmptyEventSource));
            let output = runtime.list(1, Vec::new()).await;
            let value = serde_json::to_value(&output).unwrap();

            assert!(value["events"].is_array());
            assert_eq!(value["pagination"]["max_page"], 2);
        }
    }

    mod detail {
        use super::*;

        #[test]
        fn shows_next_occurrence() {
            let runtime = runtime(Arc::new(EmptyEventSource));
            let detail = runtime.show("yoga").unwrap();

            assert_eq!(detail.event.occurrences.len(), 2);
            assert_eq!(
                detail.event.start_instant,
                Some(Utc.with_ymd_and_hms(2025, 2, 12, 6, 0, 0).unwrap())
            );
        }

        #[test]
        fn unknown_id_is_not_found() {
            let runtime = runtime(Arc::new(EmptyEventSource));
            assert!(matches!(runtime.show("nope"), Err(ClientError::NotFound(_))));
        }
    }

    #[tokio::test]
    async fn highlight_merges_manual_events() {
        let runtime = runtime(Arc::new(EmptyEventSource));
        let events = runtime
            .highlight(&HighlightLayout::default().with_count(5))
            .await;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "choir");
    }
}
