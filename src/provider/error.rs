//! Error types for provider calls.

use thiserror::Error;

/// Errors returned by a provider call.
///
/// The router treats every variant the same way: retry, then advance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Provider returned an error response (4xx, 5xx).
    #[error("Provider error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Provider response doesn't match the expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No endpoint is registered for the model.
    #[error("No provider endpoint for model '{0}'")]
    UnknownModel(String),

    /// Endpoint is misconfigured (missing API key, bad URL).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Network(_) => "network",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Upstream { .. } => "upstream",
            ProviderError::InvalidResponse(_) => "invalid_response",
            ProviderError::UnknownModel(_) => "unknown_model",
            ProviderError::Configuration(_) => "configuration",
        }
    }
}
