//! Client error types.

use eventdeck_core::TracingError;
use eventdeck_providers::{NormalizationError, ProviderError};
use eventdeck_server::ConfigError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The aggregator could not be set up.
    #[error("aggregator setup failed: {0}")]
    Aggregation(#[from] ConfigError),

    /// A source could not be built or loaded.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A manual event could not be shown.
    #[error("event error: {0}")]
    Event(#[from] NormalizationError),

    /// No manual event has the requested id.
    #[error("no manual event with id {0:?}")]
    NotFound(String),

    /// Logging could not be initialized.
    #[error("logging setup failed: {0}")]
    Tracing(#[from] TracingError),
}
