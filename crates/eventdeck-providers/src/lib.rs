//! Event sources and normalization.
//!
//! This crate provides the two collaborators of the aggregator and the
//! conversion of their records into [`NormalizedEvent`](eventdeck_core::NormalizedEvent):
//!
//! - [`ExternalEventSource`] - the remote event API ([`HttpEventSource`] with the `http` feature)
//! - [`ManualEventRepository`] - the local store of authored events ([`InMemoryManualEvents`])
//! - [`EventNormalizer`] - raw record to normalized event pipeline
//! - [`ProviderError`] - Error types for source operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐
//! │  External API   │    │  Content store   │
//! └────────┬────────┘    └────────┬─────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │RawExternalEvent  │   │ RawManualEvent   │
//! └────────┬─────────┘   └────────┬─────────┘
//!          │   EventNormalizer    │
//!          └──────────┬───────────┘
//!                     ▼
//!              ┌──────────────────┐
//!              │ NormalizedEvent  │
//!              └──────────────────┘
//! ```

pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;
pub mod normalize;
pub mod provider;
pub mod query;
pub mod raw_event;

// Re-export main types at crate root
pub use error::{NormalizationError, ProviderError, ProviderErrorCode, ProviderResult};
#[cfg(feature = "http")]
pub use http::HttpEventSource;
pub use memory::InMemoryManualEvents;
pub use normalize::{DEFAULT_FREE_LABEL, EventNormalizer};
pub use provider::{
    BoxFuture, EmptyEventSource, ErrorEventSource, ExternalEventSource, ManualEventRepository,
    PrimaryKeywordResolver,
};
pub use query::{
    DEFAULT_EXTERNAL_PAGE_SIZE, DEFAULT_MANUAL_EVENT_LIMIT, ManualEventQuery, QueryParams,
};
pub use raw_event::{
    EventSchedule, ExternalSearchResponse, ManualEventFields, RawDateRange, RawExternalEvent,
    RawLocation, RawManualEvent, RawPrice, RawProvider,
};
