//! # HTTP API
//!
//! OpenAI-compatible chat completions routed across the model registry,
//! plus endpoints to preview routing decisions and operate the circuit
//! breakers.
//!
//! ## Endpoints
//!
//! - `POST /v1/chat/completions` - Route and execute a chat completion
//! - `POST /v1/route` - Routing preview, no provider call
//! - `GET /v1/routing/profiles` - Profiles with effective weights
//! - `GET /v1/routing/breakers` - Breaker snapshots
//! - `POST /v1/routing/breakers/:id/reset` - Reset one breaker
//! - `POST /v1/routing/breakers/reset` - Reset all breakers
//! - `GET /v1/models` - Registered models with breaker state
//! - `PATCH /v1/models/:id` - Update a model's routing metrics
//! - `DELETE /v1/models/:id` - Remove a model and its breaker
//! - `GET /health` - Routability summary
//! - `GET /metrics` - Prometheus metrics
//!
//! ## Example
//!
//! ```no_run
//! use orchestrator::api::{create_router, AppState};
//! use orchestrator::config::OrchestratorConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = Arc::new(OrchestratorConfig::default());
//! let state = Arc::new(AppState::from_config(config)?);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All errors are returned in OpenAI-compatible format:
//! ```json
//! {
//!   "error": {
//!     "message": "Unknown routing profile 'turbo'. Available: quality, balanced, speed, budget, long_context",
//!     "type": "invalid_request_error",
//!     "param": "routing_profile",
//!     "code": "unknown_profile"
//!   }
//! }
//! ```

mod breakers;
mod completions;
mod error;
mod health;
mod models;
mod profiles;
mod route;
pub mod types;

pub use completions::{AUTO_MODEL, FALLBACK_FROM_HEADER, MODEL_HEADER};
pub use error::RoutingFailure;
pub use route::RoutePreviewRequest;
pub use types::*;

use crate::config::OrchestratorConfig;
use crate::metrics::MetricsCollector;
use crate::provider::{HttpProviderCaller, ProviderCaller};
use crate::registry::ModelRegistry;
use crate::routing::{self, CandidateSource};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub config: Arc<OrchestratorConfig>,
    pub router: Arc<routing::Router>,
    pub caller: Arc<dyn ProviderCaller>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Assemble state around an existing registry and provider caller.
    pub fn new(
        config: Arc<OrchestratorConfig>,
        registry: Arc<ModelRegistry>,
        caller: Arc<dyn ProviderCaller>,
    ) -> Self {
        let start_time = Instant::now();
        let source: Arc<dyn CandidateSource> = registry.clone();
        let router = Arc::new(routing::Router::from_config(source, &config));

        // Reuse a detached recorder when a global one is already installed (tests)
        let prometheus_handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            crate::metrics::PrometheusBuilder::new()
                .build_recorder()
                .handle()
        });

        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&registry),
            Arc::clone(router.breakers()),
            start_time,
            prometheus_handle,
        ));

        Self {
            registry,
            config,
            router,
            caller,
            start_time,
            metrics_collector,
        }
    }

    /// Build the registry from `[[models]]` and call providers over HTTP.
    ///
    /// # Errors
    ///
    /// Fails on duplicate model ids or if the HTTP client cannot be built.
    pub fn from_config(
        config: Arc<OrchestratorConfig>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let registry = Arc::new(config.model_registry()?);
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()?;
        let caller: Arc<dyn ProviderCaller> =
            Arc::new(HttpProviderCaller::new(http_client, Arc::clone(&registry)));
        Ok(Self::new(config, registry, caller))
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let max_body = state.config.server.max_body_bytes;
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/v1/chat/completions", post(completions::handle))
        .route("/v1/route", post(route::handle))
        .route("/v1/routing/profiles", get(profiles::handle))
        .route("/v1/routing/breakers", get(breakers::list))
        .route("/v1/routing/breakers/reset", post(breakers::reset_all))
        .route("/v1/routing/breakers/:id/reset", post(breakers::reset_one))
        .route("/v1/models", get(models::list))
        .route(
            "/v1/models/:id",
            patch(models::update).delete(models::remove),
        )
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
