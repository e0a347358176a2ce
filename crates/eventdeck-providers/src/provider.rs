//! Collaborator traits for the two event sources.
//!
//! - [`ExternalEventSource`]: the remote event API, searched with
//!   [`QueryParams`]
//! - [`ManualEventRepository`]: the local content store holding manually
//!   authored events
//! - [`PrimaryKeywordResolver`]: picks the headline category of a manual
//!   event, when the store tracks one

use std::future::Future;
use std::pin::Pin;

use eventdeck_core::Keyword;

use crate::error::{ProviderError, ProviderResult};
use crate::query::{ManualEventQuery, QueryParams};
use crate::raw_event::{ExternalSearchResponse, RawManualEvent};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the traits object-safe so the aggregator can hold
/// `Arc<dyn ExternalEventSource>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The remote event API.
///
/// # Example Implementation
///
/// ```ignore
/// struct ApiSource { client: reqwest::Client }
///
/// impl ExternalEventSource for ApiSource {
///     fn name(&self) -> &str { "api" }
///
///     fn search<'a>(&'a self, params: &'a QueryParams)
///         -> BoxFuture<'a, ProviderResult<ExternalSearchResponse>> {
///         Box::pin(async move {
///             // GET /search?{params}
///             Ok(ExternalSearchResponse::default())
///         })
///     }
/// }
/// ```
pub trait ExternalEventSource: Send + Sync {
    /// Returns the source name used in logs and errors.
    fn name(&self) -> &str;

    /// Runs one search.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport failures, unexpected status
    /// codes and bodies that are not a search response.
    fn search<'a>(
        &'a self,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, ProviderResult<ExternalSearchResponse>>;
}

/// The local content store of manually authored events.
pub trait ManualEventRepository: Send + Sync {
    /// Returns the store name used in logs and errors.
    fn name(&self) -> &str;

    /// Single-window events matching every bound of `query`, up to
    /// `query.limit`.
    fn find_plain_events<'a>(
        &'a self,
        query: &'a ManualEventQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawManualEvent>>>;

    /// Recurring events matching the text and category filters of `query`,
    /// up to `query.limit`; date bounds are not applied.
    fn find_recurring_events<'a>(
        &'a self,
        query: &'a ManualEventQuery,
    ) -> BoxFuture<'a, ProviderResult<Vec<RawManualEvent>>>;
}

/// Chooses the headline category of a manual event.
pub trait PrimaryKeywordResolver: Send + Sync {
    /// Returns the id of the primary term among `keywords`, if one is set.
    fn primary_keyword_id(&self, event_id: &str, keywords: &[Keyword]) -> Option<u64>;
}

/// An external source that never has events.
///
/// Used when no external API is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyEventSource;

impl ExternalEventSource for EmptyEventSource {
    fn name(&self) -> &str {
        "empty"
    }

    fn search<'a>(
        &'a self,
        _params: &'a QueryParams,
    ) -> BoxFuture<'a, ProviderResult<ExternalSearchResponse>> {
        Box::pin(async { Ok(ExternalSearchResponse::default()) })
    }
}

/// An external source that always fails.
///
/// This is useful for testing degraded pages.
#[derive(Debug)]
pub struct ErrorEventSource {
    name: String,
    error: ProviderError,
}

impl ErrorEventSource {
    /// Creates a failing source.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }
}

impl ExternalEventSource for ErrorEventSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn search<'a>(
        &'a self,
        _params: &'a QueryParams,
    ) -> BoxFuture<'a, ProviderResult<ExternalSearchResponse>> {
        // ProviderError holds a boxed source and is not Clone
        let error =
            ProviderError::new(self.error.code(), self.error.message()).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }
}
