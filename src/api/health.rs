//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub models: ModelCounts,
}

/// Model routability counts.
#[derive(Debug, Serialize)]
pub struct ModelCounts {
    pub total: usize,
    /// Marked available and admitted by their breaker
    pub routable: usize,
    pub circuit_open: usize,
}

/// GET /health - Healthy when every model is routable, degraded when some are.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let models = state.registry.list_models();
    let breakers = state.router.breakers();

    let routable = models
        .iter()
        .filter(|m| m.candidate.available && breakers.is_eligible(m.id()))
        .count();

    let status = match (routable, models.len()) {
        (r, t) if r == t && t > 0 => "healthy",
        (r, _) if r > 0 => "degraded",
        _ => "unhealthy",
    };

    Json(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        models: ModelCounts {
            total: models.len(),
            routable,
            circuit_open: breakers.open_count(),
        },
    })
}
