//! Provider calls.
//!
//! The router never talks HTTP itself. It hands a request and a model id to a
//! [`ProviderCaller`], which reports success or a [`ProviderError`].

mod error;
mod http;

pub use error::ProviderError;
pub use http::HttpProviderCaller;

use crate::api::types::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Calls one model with one request.
///
/// Implementations must be cancel-safe: the router may drop the returned
/// future when its own timeout fires or when the caller goes away.
#[async_trait]
pub trait ProviderCaller: Send + Sync {
    async fn call(
        &self,
        model_id: &str,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> Result<ChatCompletionResponse, ProviderError>;
}
