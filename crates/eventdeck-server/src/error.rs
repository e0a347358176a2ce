//! Aggregator error types.

use eventdeck_core::{FormatError, TimeError};
use eventdeck_providers::ProviderError;
use thiserror::Error;

/// Result type for aggregation.
pub type AggregatorResult<T> = Result<T, AggregatorError>;

/// A collaborator failed while building a listing.
///
/// Page models catch this and render an empty list.
#[derive(Debug, Error)]
pub enum AggregatorError {
    /// The external event source failed.
    #[error("external event source failed: {0}")]
    ExternalSource(#[source] ProviderError),

    /// The manual event store failed.
    #[error("manual event repository failed: {0}")]
    Repository(#[source] ProviderError),
}

impl AggregatorError {
    /// Returns the collaborator error behind this failure.
    pub fn provider_error(&self) -> &ProviderError {
        match self {
            Self::ExternalSource(e) | Self::Repository(e) => e,
        }
    }

    /// Returns true if a later request may succeed.
    pub fn is_retryable(&self) -> bool {
        self.provider_error().is_retryable()
    }
}

/// The cache store could not serve a request.
///
/// Never leaves the aggregator: reads degrade to a miss, writes are skipped.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store cannot be reached or is in a broken state.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// The event list could not be serialized.
    #[error("failed to encode cache payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored payload is not an event list.
    #[error("failed to decode cache payload: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Invalid aggregator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A display pattern does not render.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The time zone name is unknown.
    #[error(transparent)]
    TimeZone(#[from] TimeError),

    /// A numeric setting is out of range.
    #[error("invalid {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_timeout_is_retryable() {
        let err = AggregatorError::ExternalSource(ProviderError::timeout("no answer in 10s"));
        assert!(err.is_retryable());
    }

    #[test]
    fn repository_storage_failure_is_not_retryable() {
        let err = AggregatorError::Repository(
            ProviderError::storage("table missing").with_provider("json"),
        );
        assert!(!err.is_retryable());
        assert_eq!(err.provider_error().provider(), Some("json"));
    }
}
