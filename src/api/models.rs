//! Model listing and metric update handlers.

use crate::api::{ApiError, AppState};
use crate::registry::{ModelUpdate, RegisteredModel};
use crate::routing::BreakerState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

/// Models list response in OpenAI format.
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelObject>,
}

/// Individual model object, extended with routing metrics.
#[derive(Debug, Serialize)]
pub struct ModelObject {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub owned_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u32>,
    pub quality: f64,
    pub latency_ms: f64,
    pub cost_per_million: f64,
    pub available: bool,
    /// CLOSED for models whose breaker has not seen traffic yet
    pub breaker_state: BreakerState,
}

impl ModelObject {
    fn new(model: RegisteredModel, breaker_state: BreakerState) -> Self {
        Self {
            owned_by: model
                .provider
                .clone()
                .unwrap_or_else(|| "orchestrator".to_string()),
            created: model.updated_at.timestamp(),
            context_length: model.candidate.context_window,
            quality: model.candidate.quality,
            latency_ms: model.candidate.latency_ms,
            cost_per_million: model.candidate.cost_per_million,
            available: model.candidate.available,
            id: model.candidate.id,
            object: "model".to_string(),
            breaker_state,
        }
    }
}

fn breaker_state(state: &AppState, model_id: &str) -> BreakerState {
    state
        .router
        .breakers()
        .state(model_id)
        .unwrap_or(BreakerState::Closed)
}

/// GET /v1/models - All registered models.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    let data = state
        .registry
        .list_models()
        .into_iter()
        .map(|model| {
            let breaker = breaker_state(&state, model.id());
            ModelObject::new(model, breaker)
        })
        .collect();

    Json(ModelsResponse {
        object: "list".to_string(),
        data,
    })
}

/// PATCH /v1/models/:id - Update a model's routing metrics.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
    Json(update): Json<ModelUpdate>,
) -> Result<Json<ModelObject>, ApiError> {
    let model = state.registry.update_model(&model_id, &update)?;
    tracing::info!(model_id = %model_id, ?update, "model metrics updated");
    let breaker = breaker_state(&state, &model_id);
    Ok(Json(ModelObject::new(model, breaker)))
}

/// DELETE /v1/models/:id - Take a model out of rotation for good.
///
/// The model's breaker goes with it, so a later re-registration starts CLOSED.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
) -> Result<Json<ModelObject>, ApiError> {
    let model = state.registry.remove_model(&model_id)?;
    let breaker = breaker_state(&state, &model_id);
    state.router.breakers().remove(&model_id);
    tracing::info!(model_id = %model_id, breaker = %breaker, "model removed");
    Ok(Json(ModelObject::new(model, breaker)))
}
