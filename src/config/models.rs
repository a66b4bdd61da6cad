//! Static model definitions

use serde::{Deserialize, Serialize};

use crate::registry::{ProviderEndpoint, RegisteredModel};
use crate::routing::ModelCandidate;

/// One `[[models]]` entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Normalized quality score in [0, 1]
    pub quality: f64,
    pub latency_ms: f64,
    /// Blended price per million tokens
    pub cost_per_million: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    #[serde(default = "default_available")]
    pub available: bool,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_available() -> bool {
    true
}

impl ModelConfig {
    /// Field-level check; `index` is the position in `[[models]]`
    pub fn validate(&self, index: usize) -> Result<(), (String, String)> {
        let field = |name: &str| format!("models[{}].{}", index, name);
        if self.id.trim().is_empty() {
            return Err((field("id"), "id cannot be empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err((field("base_url"), "URL cannot be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err((field("quality"), "must be within [0, 1]".to_string()));
        }
        if !(self.latency_ms > 0.0 && self.latency_ms.is_finite()) {
            return Err((field("latency_ms"), "must be positive".to_string()));
        }
        if !(self.cost_per_million >= 0.0 && self.cost_per_million.is_finite()) {
            return Err((field("cost_per_million"), "must be non-negative".to_string()));
        }
        if self.context_window == Some(0) {
            return Err((field("context_window"), "must be positive".to_string()));
        }
        Ok(())
    }
}

impl From<&ModelConfig> for RegisteredModel {
    fn from(config: &ModelConfig) -> Self {
        let candidate = ModelCandidate {
            id: config.id.clone(),
            quality: config.quality,
            latency_ms: config.latency_ms,
            cost_per_million: config.cost_per_million,
            context_window: config.context_window,
            available: config.available,
        };
        let endpoint = ProviderEndpoint {
            base_url: config.base_url.clone(),
            upstream_model: config.upstream_model.clone(),
            api_key_env: config.api_key_env.clone(),
        };
        let mut model = RegisteredModel::new(candidate, endpoint);
        model.provider = config.provider.clone();
        model
    }
}
