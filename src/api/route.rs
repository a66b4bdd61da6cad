//! Routing preview endpoint handler.

use crate::api::{AppState, RoutingFailure};
use crate::routing::{RouteRequest, RoutingResult};
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use super::completions::options_for_model;

/// Body of `POST /v1/route`.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutePreviewRequest {
    pub prompt: String,
    #[serde(default)]
    pub routing_profile: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// `auto` or a registered id to pin
    #[serde(default)]
    pub model: Option<String>,
    /// Models to leave out of the ranking
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// POST /v1/route - Rank models for a prompt without calling any provider.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RoutePreviewRequest>,
) -> Result<Json<RoutingResult>, RoutingFailure> {
    let profile = body
        .routing_profile
        .unwrap_or_else(|| state.config.routing.default_profile.clone());
    let mut options = options_for_model(body.model.as_deref().unwrap_or(""));
    options.exclude.extend(body.exclude);

    let request = RouteRequest {
        prompt: body.prompt,
        max_tokens: body.max_tokens,
    };
    state
        .router
        .route_with(&request, &profile, &options)
        .map(Json)
        .map_err(|e| RoutingFailure::from_routing_error(e, &state.registry.model_ids()))
}
