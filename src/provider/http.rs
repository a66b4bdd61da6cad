//! OpenAI-compatible HTTP provider.

use super::{ProviderCaller, ProviderError};
use crate::api::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::registry::ModelRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Calls `POST {base_url}/v1/chat/completions` on the endpoint registered for
/// each model.
pub struct HttpProviderCaller {
    client: reqwest::Client,
    registry: Arc<ModelRegistry>,
}

impl HttpProviderCaller {
    pub fn new(client: reqwest::Client, registry: Arc<ModelRegistry>) -> Self {
        Self { client, registry }
    }
}

fn bearer_token(env_var: Option<&str>) -> Result<Option<String>, ProviderError> {
    match env_var {
        None => Ok(None),
        Some(name) => std::env::var(name).map(Some).map_err(|_| {
            ProviderError::Configuration(format!("environment variable {} is not set", name))
        }),
    }
}

#[async_trait]
impl ProviderCaller for HttpProviderCaller {
    async fn call(
        &self,
        model_id: &str,
        request: &ChatCompletionRequest,
        timeout: Duration,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let endpoint = self
            .registry
            .endpoint(model_id)
            .ok_or_else(|| ProviderError::UnknownModel(model_id.to_string()))?;

        let url = format!(
            "{}/v1/chat/completions",
            endpoint.base_url.trim_end_matches('/')
        );

        let mut body = request.clone();
        body.model = endpoint.upstream_model_name(model_id).to_string();
        body.stream = false;
        body.routing_profile = None;

        let mut builder = self.client.post(&url).json(&body).timeout(timeout);
        if let Some(token) = bearer_token(endpoint.api_key_env.as_deref())? {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(timeout.as_millis() as u64)
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: error_body,
            });
        }

        response.json::<ChatCompletionResponse>().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse completion response: {}", e))
        })
    }
}
