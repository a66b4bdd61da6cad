//! Chat completions endpoint handler.

use crate::api::{ApiError, AppState, ChatCompletionRequest, RoutingFailure};
use crate::routing::RouteOptions;
use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, Instrument};

/// Model value that lets the router choose
pub const AUTO_MODEL: &str = "auto";

/// Header naming the model that produced the response (lowercase for HTTP/2 compatibility)
pub const MODEL_HEADER: &str = "x-orchestrator-model";

/// Header naming the primary selection when a fallback served the request
pub const FALLBACK_FROM_HEADER: &str = "x-orchestrator-fallback-from";

/// Routing options implied by the request's `model` field
pub(crate) fn options_for_model(model: &str) -> RouteOptions {
    if model.is_empty() || model == AUTO_MODEL {
        RouteOptions::default()
    } else {
        RouteOptions::pinned(model)
    }
}

/// POST /v1/chat/completions - Route and execute a chat completion.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, RoutingFailure> {
    if request.stream {
        return Err(ApiError::bad_request("Streaming responses are not supported").into());
    }
    if request.messages.is_empty() {
        return Err(ApiError::bad_request("messages must not be empty").into());
    }

    let profile = request
        .routing_profile
        .clone()
        .unwrap_or_else(|| state.config.routing.default_profile.clone());
    let options = options_for_model(&request.model);

    let request_id = crate::logging::generate_request_id();
    let span = tracing::info_span!("chat_completion", request_id = %request_id);
    info!(parent: &span, model = %request.model, profile = %profile, "Chat completion request");

    let execution = state
        .router
        .execute_with(&request, &profile, state.caller.as_ref(), &options)
        .instrument(span.clone())
        .await
        .map_err(|e| RoutingFailure::from_routing_error(e, &state.registry.model_ids()))?;

    info!(
        parent: &span,
        model_used = %execution.model_used,
        failed_attempts = execution.attempts.len(),
        fallback = execution.was_fallback(),
        "Request succeeded"
    );

    let fallback_from = execution
        .was_fallback()
        .then(|| execution.routing.primary().map(|p| p.model_id.clone()))
        .flatten();

    let mut resp = Json(execution.response).into_response();
    if let Ok(value) = HeaderValue::from_str(&execution.model_used) {
        resp.headers_mut()
            .insert(HeaderName::from_static(MODEL_HEADER), value);
    }
    if let Some(from) = fallback_from {
        if let Ok(value) = HeaderValue::from_str(&from) {
            resp.headers_mut()
                .insert(HeaderName::from_static(FALLBACK_FROM_HEADER), value);
        }
    }
    Ok(resp)
}
