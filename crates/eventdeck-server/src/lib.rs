//! Aggregator: query keys, cache, merged listing, page models.
//!
//! This crate combines the external event source with the manual event
//! store:
//! - Canonical query parameters and cache key derivation
//! - Merged listing cache with TTL
//! - The merged, time-ordered event listing
//! - Page models for the combined list and combined search pages
//! - Single event detail and highlight block merging
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use eventdeck_providers::{EmptyEventSource, InMemoryManualEvents};
//! use eventdeck_server::{
//!     AggregatorConfig, CombinedEventsList, EventAggregator, MemoryCache, PageSettings,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let aggregator = EventAggregator::new(
//!         AggregatorConfig::default(),
//!         Arc::new(EmptyEventSource),
//!         Arc::new(InMemoryManualEvents::default()),
//!         Arc::new(MemoryCache::new()),
//!     )?;
//!
//!     let page = CombinedEventsList::new(&aggregator, PageSettings::default(), 1);
//!     let events = page.events().await;
//!     println!("{} events", events.pagination.total_items);
//!     Ok(())
//! }
//! ```

mod aggregator;
mod cache;
mod config;
mod detail;
mod error;
mod highlight;
mod pages;
mod query;

pub use aggregator::{AggregationMode, EventAggregator, one_year_after};
pub use cache::{CacheStore, MemoryCache};
pub use config::{
    AggregatorConfig, DEFAULT_CACHE_TTL, LIST_CACHE_GROUP, PageSettings, SEARCH_CACHE_GROUP,
};
pub use detail::EventDetail;
pub use error::{AggregatorError, AggregatorResult, CacheError, ConfigError};
pub use highlight::{DEFAULT_HIGHLIGHT_COUNT, HighlightLayout, merge_highlight_events};
pub use pages::{
    CombinedEventsList, CombinedEventsSearch, PageEvents, SEARCH_SORT, SearchDates, SearchForm,
    SearchInput,
};
pub use query::{SearchFlags, cache_key, canonical_json};
