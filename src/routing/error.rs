//! Error types for routing failures

use serde::Serialize;
use thiserror::Error;

/// One failed provider call made while walking a fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub model_id: String,
    /// 1-based attempt number for this model
    pub attempt: u32,
    pub error: String,
}

/// Errors surfaced by the router
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The profile name is not one of the configured profiles
    #[error("Unknown routing profile '{profile}'")]
    UnknownProfile { profile: String },

    /// A pinned model is not known to the registry
    #[error("Model '{model}' not found")]
    ModelNotFound { model: String },

    /// Every candidate is unavailable, breaker-open or violates a constraint
    #[error("No eligible model for profile '{profile}'")]
    NoEligibleModel { profile: String },

    /// Every model in the fallback chain failed all of its attempts
    #[error("All models exhausted after {} attempts: {:?}", attempts.len(), attempted_models(attempts))]
    AllModelsExhausted { attempts: Vec<AttemptRecord> },
}

impl RoutingError {
    /// Short label used for metrics and API error codes
    pub fn kind(&self) -> &'static str {
        match self {
            RoutingError::UnknownProfile { .. } => "unknown_profile",
            RoutingError::ModelNotFound { .. } => "model_not_found",
            RoutingError::NoEligibleModel { .. } => "no_eligible_model",
            RoutingError::AllModelsExhausted { .. } => "all_models_exhausted",
        }
    }
}

/// Distinct model ids in attempt order
pub fn attempted_models(attempts: &[AttemptRecord]) -> Vec<String> {
    let mut models: Vec<String> = Vec::new();
    for record in attempts {
        if !models.contains(&record.model_id) {
            models.push(record.model_id.clone());
        }
    }
    models
}
