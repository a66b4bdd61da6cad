//! Shared test utilities for orchestrator integration tests.
//!
//! Provides builders for candidates, registries and chat requests, plus a
//! scripted provider caller that fails on demand.

#![allow(dead_code)]

use async_trait::async_trait;
use orchestrator::api::{
    create_router, AppState, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice,
    MessageContent,
};
use orchestrator::config::OrchestratorConfig;
use orchestrator::provider::{ProviderCaller, ProviderError};
use orchestrator::registry::{ModelRegistry, ProviderEndpoint, RegisteredModel};
use orchestrator::routing::{
    CircuitBreakerRegistry, ModelCandidate, RetryPolicy, Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Candidates and registries
// =============================================================================

/// Model A: high quality, slow, expensive
pub fn model_a() -> ModelCandidate {
    ModelCandidate::new("A", 0.9, 500.0, 10.0)
}

/// Model B: lower quality, fast, cheap
pub fn model_b() -> ModelCandidate {
    ModelCandidate::new("B", 0.5, 100.0, 1.0)
}

pub fn registry_with(candidates: Vec<ModelCandidate>, base_url: &str) -> Arc<ModelRegistry> {
    let registry = ModelRegistry::new();
    for candidate in candidates {
        registry
            .add_model(RegisteredModel::new(
                candidate,
                ProviderEndpoint::new(base_url),
            ))
            .unwrap();
    }
    Arc::new(registry)
}

/// Router over a fixed candidate list with immediate retries
pub fn test_router(candidates: Vec<ModelCandidate>, max_attempts: u32) -> Router {
    Router::new(
        Arc::new(candidates),
        Arc::new(CircuitBreakerRegistry::default()),
    )
    .with_retry(RetryPolicy::immediate(max_attempts, Duration::from_secs(2)))
}

// =============================================================================
// Requests and responses
// =============================================================================

pub fn user_message(text: &str) -> ChatMessage {
    ChatMessage {
        role: "user".to_string(),
        content: MessageContent::Text {
            content: text.to_string(),
        },
        name: None,
    }
}

pub fn chat_request(text: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: "auto".to_string(),
        messages: vec![user_message(text)],
        ..ChatCompletionRequest::default()
    }
}

pub fn completion(model: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: format!("chatcmpl-{}", model),
        object: "chat.completion".to_string(),
        created: 1_700_000_000,
        model: model.to_string(),
        choices: vec![Choice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content: MessageContent::Text {
                    content: format!("answer from {}", model),
                },
                name: None,
            },
            finish_reason: Some("stop".to_string()),
        }],
        usage: None,
    }
}

pub fn completion_json(model: &str) -> serde_json::Value {
    serde_json::to_value(completion(model)).unwrap()
}

// =============================================================================
// Scripted provider
// =============================================================================

/// Provider that fails each model a configured number of times before
/// answering. Models without an entry always succeed.
#[derive(Default)]
pub struct ScriptedCaller {
    failures: HashMap<String, u32>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `model_id` for its first `times` calls
    pub fn failing(mut self, model_id: &str, times: u32) -> Self {
        self.failures.insert(model_id.to_string(), times);
        self
    }

    /// Sleep before every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, model_id: &str) -> usize {
        self.calls().iter().filter(|c| *c == model_id).count()
    }
}

#[async_trait]
impl ProviderCaller for ScriptedCaller {
    async fn call(
        &self,
        model_id: &str,
        _request: &ChatCompletionRequest,
        _timeout: Duration,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let made = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(model_id.to_string());
            calls.iter().filter(|c| *c == model_id).count() as u32
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let allowed = self.failures.get(model_id).copied().unwrap_or(0);
        if made <= allowed {
            Err(ProviderError::Upstream {
                status: 503,
                message: format!("{} overloaded", model_id),
            })
        } else {
            Ok(completion(model_id))
        }
    }
}

// =============================================================================
// App builders
// =============================================================================

/// Config with fast retries so fallback tests finish quickly
pub fn fast_config() -> OrchestratorConfig {
    let mut config = OrchestratorConfig::default();
    config.retry.max_attempts = 1;
    config.retry.initial_backoff_ms = 0;
    config.retry.attempt_timeout_seconds = 5;
    config
}

/// App over `registry` calling providers through `caller`
pub fn app_with(
    config: OrchestratorConfig,
    registry: Arc<ModelRegistry>,
    caller: Arc<dyn ProviderCaller>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Arc::new(config), registry, caller));
    (create_router(Arc::clone(&state)), state)
}
