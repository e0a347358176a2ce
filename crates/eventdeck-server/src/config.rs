//! Aggregator and page configuration.

use std::time::Duration;

use chrono_tz::Tz;
use eventdeck_core::{
    DEFAULT_EVENT_TIME_ZONE, DateFormatter, DisplayFormat, EventTimeZone, effective_per_page,
};
use eventdeck_providers::{DEFAULT_EXTERNAL_PAGE_SIZE, DEFAULT_MANUAL_EVENT_LIMIT};

use crate::error::ConfigError;

/// Lifetime of a cached listing.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Cache group of the combined list page.
pub const LIST_CACHE_GROUP: &str = "page-combined-events-list";

/// Cache group of the combined search page.
pub const SEARCH_CACHE_GROUP: &str = "page-combined-events-search";

/// Aggregator configuration.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Zone manual timestamps are authored and displayed in.
    pub time_zone: Tz,

    /// How long a merged listing stays cached.
    pub cache_ttl: Duration,

    /// Row cap per manual event query.
    pub manual_event_limit: usize,

    /// Page size requested from the external source.
    pub external_page_size: usize,

    pub format: DisplayFormat,

    pub list_cache_group: String,
    pub search_cache_group: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_EVENT_TIME_ZONE,
            cache_ttl: DEFAULT_CACHE_TTL,
            manual_event_limit: DEFAULT_MANUAL_EVENT_LIMIT,
            external_page_size: DEFAULT_EXTERNAL_PAGE_SIZE,
            format: DisplayFormat::default(),
            list_cache_group: LIST_CACHE_GROUP.to_string(),
            search_cache_group: SEARCH_CACHE_GROUP.to_string(),
        }
    }
}

impl AggregatorConfig {
    /// Creates a configuration for the given event zone.
    pub fn new(time_zone: Tz) -> Self {
        Self {
            time_zone,
            ..Default::default()
        }
    }

    /// Builder: set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Builder: set the manual event row cap.
    pub fn with_manual_event_limit(mut self, limit: usize) -> Self {
        self.manual_event_limit = limit;
        self
    }

    /// Builder: set the external page size.
    pub fn with_external_page_size(mut self, page_size: usize) -> Self {
        self.external_page_size = page_size;
        self
    }

    /// Builder: set the display patterns.
    pub fn with_format(mut self, format: DisplayFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder: set both cache group names.
    pub fn with_cache_groups(
        mut self,
        list: impl Into<String>,
        search: impl Into<String>,
    ) -> Self {
        self.list_cache_group = list.into();
        self.search_cache_group = search.into();
        self
    }

    /// Returns the event time zone.
    pub fn event_time_zone(&self) -> EventTimeZone {
        EventTimeZone::new(self.time_zone)
    }

    /// Returns a formatter for the configured zone and patterns.
    pub fn formatter(&self) -> DateFormatter {
        DateFormatter::new(self.event_time_zone(), self.format.clone())
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error for unrenderable patterns, a zero row cap or page
    /// size, identical cache groups or a zero TTL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.format.validate()?;
        if self.manual_event_limit == 0 {
            return Err(ConfigError::invalid_value(
                "manual_event_limit",
                "must be at least 1",
            ));
        }
        if self.external_page_size == 0 {
            return Err(ConfigError::invalid_value(
                "external_page_size",
                "must be at least 1",
            ));
        }
        if self.cache_ttl.is_zero() {
            return Err(ConfigError::invalid_value("cache_ttl", "must not be zero"));
        }
        if self.list_cache_group == self.search_cache_group {
            return Err(ConfigError::invalid_value(
                "cache groups",
                "list and search pages need distinct groups",
            ));
        }
        Ok(())
    }
}

/// Per-page settings chosen by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    pub posts_per_page: usize,
    /// Show everything on one page.
    pub disable_pagination: bool,
    /// External category filter.
    pub category_ids: Vec<String>,
    pub show_images: bool,
    /// Intro text shown above the list.
    pub description: Option<String>,
    /// Copy shown when a listing is empty.
    pub no_results: String,
    /// Copy shown on the search page before a term is entered.
    pub no_search_term: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            posts_per_page: 10,
            disable_pagination: false,
            category_ids: Vec::new(),
            show_images: true,
            description: None,
            no_results: "No results".to_string(),
            no_search_term: "No search term given".to_string(),
        }
    }
}

impl PageSettings {
    /// Builder: set the page size.
    pub fn with_posts_per_page(mut self, per_page: usize) -> Self {
        self.posts_per_page = per_page;
        self
    }

    /// Builder: show everything on one page.
    pub fn with_pagination_disabled(mut self, disabled: bool) -> Self {
        self.disable_pagination = disabled;
        self
    }

    /// Builder: set the external category filter.
    pub fn with_category_ids(mut self, ids: Vec<String>) -> Self {
        self.category_ids = ids;
        self
    }

    /// Builder: set the intro text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Effective page size after the pagination toggle.
    pub fn per_page(&self) -> usize {
        effective_per_page(self.posts_per_page, self.disable_pagination)
    }
}
