//! HTTP client for the external event API.
//!
//! A search is one `GET` to the configured endpoint with the rendered
//! [`QueryParams`]; the body is an [`ExternalSearchResponse`].

use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxFuture, ExternalEventSource};
use crate::query::QueryParams;
use crate::raw_event::ExternalSearchResponse;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// External event API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl HttpEventSource {
    /// Creates a source searching `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the endpoint is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> ProviderResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            ProviderError::configuration(format!("invalid external endpoint {endpoint:?}: {e}"))
                .with_provider("http")
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ProviderError::configuration(format!(
                "unsupported endpoint scheme: {}",
                endpoint.scheme()
            ))
            .with_provider("http"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ProviderError::configuration(format!("failed to create HTTP client: {e}"))
                    .with_provider("http")
                    .with_source(e)
            })?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    /// Returns the search endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Builds the request URL for `params`.
    pub fn search_url(&self, params: &QueryParams) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params.to_query_pairs() {
                query.append_pair(key, &value);
            }
        }
        url
    }

    async fn fetch(&self, params: &QueryParams) -> ProviderResult<ExternalSearchResponse> {
        let url = self.search_url(params);
        debug!(url = %url, "searching external events");

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::timeout("request timeout")
            } else if e.is_connect() {
                ProviderError::network(format!("connection failed: {}", e))
            } else {
                ProviderError::network(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )));
        }

        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::bad_request(format!(
                "search rejected ({}): {}",
                status, body
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::server(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        let parsed: ExternalSearchResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })?;

        if parsed.events.is_empty() {
            debug!("external search returned no events");
        }
        Ok(parsed)
    }
}

impl ExternalEventSource for HttpEventSource {
    fn name(&self) -> &str {
        "http"
    }

    fn search<'a>(
        &'a self,
        params: &'a QueryParams,
    ) -> BoxFuture<'a, ProviderResult<ExternalSearchResponse>> {
        Box::pin(async move {
            self.fetch(params).await.map_err(|e| {
                warn!(error = %e, "external search failed");
                e.with_provider("http")
            })
        })
    }
}
