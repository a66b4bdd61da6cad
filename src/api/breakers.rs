//! Circuit breaker inspection and manual reset.

use crate::api::{ApiError, AppState};
use crate::routing::BreakerSnapshot;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct BreakersResponse {
    pub failure_threshold: u32,
    pub cooldown_seconds: u64,
    pub breakers: Vec<BreakerSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub reset: Vec<String>,
}

/// GET /v1/routing/breakers - Every breaker that has seen traffic.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<BreakersResponse> {
    let breakers = state.router.breakers();
    Json(BreakersResponse {
        failure_threshold: breakers.failure_threshold(),
        cooldown_seconds: breakers.cooldown().as_secs(),
        breakers: breakers.snapshots(),
    })
}

/// POST /v1/routing/breakers/:id/reset - Force one breaker CLOSED.
pub async fn reset_one(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
) -> Result<Json<ResetResponse>, ApiError> {
    let known = state.registry.contains(&model_id);
    let had_breaker = state.router.breakers().reset(&model_id);
    if !known && !had_breaker {
        return Err(ApiError::model_not_found(
            &model_id,
            &state.registry.model_ids(),
        ));
    }
    tracing::info!(model_id = %model_id, "circuit breaker reset by operator");
    Ok(Json(ResetResponse {
        reset: vec![model_id],
    }))
}

/// POST /v1/routing/breakers/reset - Force every breaker CLOSED.
pub async fn reset_all(State(state): State<Arc<AppState>>) -> Json<ResetResponse> {
    let breakers = state.router.breakers();
    let ids = breakers
        .snapshots()
        .into_iter()
        .map(|s| s.model_id)
        .collect();
    breakers.reset_all();
    tracing::info!("all circuit breakers reset by operator");
    Json(ResetResponse { reset: ids })
}
