//! Routing profile listing.

use crate::api::AppState;
use crate::routing::profiles::NormalizedWeights;
use crate::routing::ProfileName;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ProfilesResponse {
    pub default_profile: String,
    pub profiles: Vec<ProfileObject>,
}

#[derive(Debug, Serialize)]
pub struct ProfileObject {
    pub name: ProfileName,
    pub description: &'static str,
    pub weights: NormalizedWeights,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cost_per_million: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_context_window: Option<u32>,
}

/// GET /v1/routing/profiles - The five profiles with effective weights.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<ProfilesResponse> {
    let profiles = state
        .router
        .profiles()
        .iter()
        .map(|(name, profile)| ProfileObject {
            name,
            description: name.description(),
            weights: profile.normalized_weights(),
            min_quality: profile.min_quality,
            max_latency_ms: profile.max_latency_ms,
            max_cost_per_million: profile.max_cost_per_million,
            min_context_window: profile.min_context_window,
        })
        .collect();

    Json(ProfilesResponse {
        default_profile: state.config.routing.default_profile.clone(),
        profiles,
    })
}
