//! Mapping of routing failures onto OpenAI-style error envelopes.

use super::types::{ApiError, ApiErrorBody};
use crate::registry::RegistryError;
use crate::routing::{error::attempted_models, AttemptRecord, ProfileName, RoutingError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Error response for routed endpoints.
///
/// Serializes as the standard `{"error": {...}}` envelope; exhausted chains
/// add the per-attempt history so clients can see what was tried.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingFailure {
    #[serde(flatten)]
    pub api: ApiError,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<AttemptRecord>,
}

impl RoutingFailure {
    /// Build the response for a routing error.
    ///
    /// `available` lists registered model ids for the not-found hint.
    pub fn from_routing_error(err: RoutingError, available: &[String]) -> Self {
        match err {
            RoutingError::UnknownProfile { profile } => {
                let names: Vec<&str> = ProfileName::ALL.iter().map(|p| p.as_str()).collect();
                ApiError::unknown_profile(&profile, &names).into()
            }
            RoutingError::ModelNotFound { model } => {
                ApiError::model_not_found(&model, available).into()
            }
            RoutingError::NoEligibleModel { profile } => ApiError::service_unavailable(&format!(
                "No eligible model for routing profile '{}'",
                profile
            ))
            .into(),
            RoutingError::AllModelsExhausted { attempts } => {
                let message = format!(
                    "All models exhausted after {} attempts: {}",
                    attempts.len(),
                    attempted_models(&attempts).join(", ")
                );
                Self {
                    api: ApiError::bad_gateway(&message),
                    attempts,
                }
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.api.status_code()
    }
}

impl From<ApiError> for RoutingFailure {
    fn from(api: ApiError) -> Self {
        Self {
            api,
            attempts: Vec::new(),
        }
    }
}

impl IntoResponse for RoutingFailure {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ModelNotFound(model) => ApiError::model_not_found(&model, &[]),
            RegistryError::InvalidUpdate { model, message } => ApiError {
                error: ApiErrorBody {
                    message: format!("Invalid update for '{}': {}", model, message),
                    r#type: "invalid_request_error".to_string(),
                    param: None,
                    code: Some("invalid_request_error".to_string()),
                },
            },
            RegistryError::DuplicateModel(model) => {
                ApiError::bad_request(&format!("Model '{}' already exists", model))
            }
        }
    }
}
