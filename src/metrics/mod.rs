//! # Metrics Collection Module
//!
//! Prometheus export of routing, provider and circuit breaker activity.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `orchestrator_routing_decisions_total{profile, tier}` - Successful routing decisions
//! - `orchestrator_routing_errors_total{error_type}` - Routing failures by kind
//! - `orchestrator_provider_attempts_total{model, outcome}` - Provider calls by outcome
//! - `orchestrator_fallbacks_total{from_model, to_model}` - Requests served by a fallback
//! - `orchestrator_breaker_transitions_total{model, to}` - Circuit breaker state changes
//!
//! **Histograms:**
//! - `orchestrator_request_duration_seconds{model}` - Provider call duration
//!
//! **Gauges:**
//! - `orchestrator_models_total` - Registered models
//! - `orchestrator_breakers_open` - Breakers currently OPEN
//!
//! Recording functions are no-ops until a recorder is installed with
//! [`setup_metrics`], so library users and unit tests pay nothing.

pub mod handler;

// Re-export PrometheusBuilder for test compatibility
pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::registry::ModelRegistry;
use crate::routing::{BreakerState, CircuitBreakerRegistry};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Replace characters Prometheus rejects with underscores.
///
/// Prometheus label names must match `[a-zA-Z_][a-zA-Z0-9_]*`; model ids
/// like `gpt-4o` or `llama-3-70b` are sanitized the same way so dashboards
/// can reuse them as identifiers.
pub fn sanitize_label(label: &str) -> String {
    let mut sanitized = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();

    if sanitized.is_empty() || sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        sanitized.insert(0, '_');
    }
    sanitized
}

pub fn record_routing_decision(profile: &str, tier: &str) {
    metrics::counter!(
        "orchestrator_routing_decisions_total",
        "profile" => profile.to_string(),
        "tier" => tier.to_string()
    )
    .increment(1);
}

pub fn record_routing_error(error_type: &str) {
    metrics::counter!(
        "orchestrator_routing_errors_total",
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// One provider call: outcome is `success` or the provider error kind
pub fn record_attempt(model_id: &str, outcome: &str, duration: Duration) {
    let model = sanitize_label(model_id);
    metrics::counter!(
        "orchestrator_provider_attempts_total",
        "model" => model.clone(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("orchestrator_request_duration_seconds", "model" => model)
        .record(duration.as_secs_f64());
}

pub fn record_fallback(from_model: &str, to_model: &str) {
    metrics::counter!(
        "orchestrator_fallbacks_total",
        "from_model" => sanitize_label(from_model),
        "to_model" => sanitize_label(to_model)
    )
    .increment(1);
}

pub fn record_breaker_transition(model_id: &str, to: BreakerState) {
    metrics::counter!(
        "orchestrator_breaker_transitions_total",
        "model" => sanitize_label(model_id),
        "to" => to.as_str()
    )
    .increment(1);
}

/// Computes gauges from live state and renders the Prometheus text format.
pub struct MetricsCollector {
    registry: Arc<ModelRegistry>,
    breakers: Arc<CircuitBreakerRegistry>,
    start_time: Instant,
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        registry: Arc<ModelRegistry>,
        breakers: Arc<CircuitBreakerRegistry>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            registry,
            breakers,
            start_time,
            prometheus_handle,
        }
    }

    /// Refresh gauges derived from the registry and breaker state.
    pub fn update_gauges(&self) {
        metrics::gauge!("orchestrator_models_total").set(self.registry.model_count() as f64);
        metrics::gauge!("orchestrator_breakers_open").set(self.breakers.open_count() as f64);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Duration buckets are in seconds and sized for LLM calls:
/// [0.1, 0.25, 0.5, 1, 2.5, 5, 10, 30, 60, 120, 300].
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::Matcher;

    let duration_buckets = &[
        0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("orchestrator_request_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}
