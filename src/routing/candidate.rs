//! Routable model snapshots and the source that supplies them

use serde::{Deserialize, Serialize};

/// A routable model snapshot.
///
/// Immutable for the duration of one routing decision. `quality` is in
/// [0, 1] (higher is better), `latency_ms` is positive and
/// `cost_per_million` is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCandidate {
    pub id: String,
    pub quality: f64,
    pub latency_ms: f64,
    pub cost_per_million: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_window: Option<u32>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl ModelCandidate {
    /// Create an available candidate without a known context window.
    pub fn new(id: impl Into<String>, quality: f64, latency_ms: f64, cost_per_million: f64) -> Self {
        Self {
            id: id.into(),
            quality,
            latency_ms,
            cost_per_million,
            context_window: None,
            available: true,
        }
    }

    pub fn with_context_window(mut self, tokens: u32) -> Self {
        self.context_window = Some(tokens);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }
}

/// Supplies the current candidate set to the router.
///
/// Implementations must already have resolved availability; the router does
/// not re-check liveness beyond the circuit breaker.
pub trait CandidateSource: Send + Sync {
    fn list_candidates(&self) -> Vec<ModelCandidate>;
}

impl CandidateSource for Vec<ModelCandidate> {
    fn list_candidates(&self) -> Vec<ModelCandidate> {
        self.clone()
    }
}
