use crate::routing::ModelCandidate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where and how to reach a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    /// Base URL of an OpenAI-compatible API (e.g., "https://api.openai.com")
    pub base_url: String,
    /// Model name sent upstream, when it differs from the registry id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_model: Option<String>,
    /// Environment variable holding the bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

impl ProviderEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            upstream_model: None,
            api_key_env: None,
        }
    }

    /// Model name to put in the upstream request body
    pub fn upstream_model_name<'a>(&'a self, model_id: &'a str) -> &'a str {
        self.upstream_model.as_deref().unwrap_or(model_id)
    }
}

/// A model known to the registry: routing metrics plus its endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredModel {
    #[serde(flatten)]
    pub candidate: ModelCandidate,
    /// Free-form provider label (e.g., "openai")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    pub endpoint: ProviderEndpoint,
    pub updated_at: DateTime<Utc>,
}

impl RegisteredModel {
    pub fn new(candidate: ModelCandidate, endpoint: ProviderEndpoint) -> Self {
        Self {
            candidate,
            provider: None,
            endpoint,
            updated_at: Utc::now(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

/// Partial metric update fed by benchmark sync or an operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelUpdate {
    pub quality: Option<f64>,
    pub latency_ms: Option<f64>,
    pub cost_per_million: Option<f64>,
    pub context_window: Option<u32>,
    pub available: Option<bool>,
}

impl ModelUpdate {
    /// Reject values outside their valid ranges
    pub fn validate(&self) -> Result<(), String> {
        if matches!(self.quality, Some(q) if !(0.0..=1.0).contains(&q)) {
            return Err("quality must be within [0, 1]".to_string());
        }
        if matches!(self.latency_ms, Some(l) if l <= 0.0 || !l.is_finite()) {
            return Err("latency_ms must be positive".to_string());
        }
        if matches!(self.cost_per_million, Some(c) if c < 0.0 || !c.is_finite()) {
            return Err("cost_per_million must be non-negative".to_string());
        }
        if self.context_window == Some(0) {
            return Err("context_window must be positive".to_string());
        }
        Ok(())
    }

    pub(crate) fn apply(&self, candidate: &mut ModelCandidate) {
        if let Some(q) = self.quality {
            candidate.quality = q;
        }
        if let Some(l) = self.latency_ms {
            candidate.latency_ms = l;
        }
        if let Some(c) = self.cost_per_million {
            candidate.cost_per_million = c;
        }
        if self.context_window.is_some() {
            candidate.context_window = self.context_window;
        }
        if let Some(a) = self.available {
            candidate.available = a;
        }
    }
}
