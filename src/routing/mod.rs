//! Profile-weighted model routing
//!
//! A routing decision classifies the request, resolves the profile, scores
//! the registry's candidates, drops every model whose circuit breaker refuses
//! traffic and returns the surviving ranking as a fallback chain.
//! [`Router::execute`] then walks that chain in rank order, retrying each
//! model with exponential backoff before moving on.

use std::sync::Arc;
use std::time::Instant;

pub mod candidate;
pub mod circuit_breaker;
pub mod complexity;
pub mod error;
pub mod profiles;
pub mod request;
pub mod retry;
pub mod scoring;

pub use candidate::{CandidateSource, ModelCandidate};
pub use circuit_breaker::{
    BreakerPermit, BreakerSnapshot, BreakerState, CircuitBreakerConfig, CircuitBreakerRegistry,
};
pub use complexity::{ComplexityAssessment, ComplexityClassifier, ComplexityTier};
pub use error::{AttemptRecord, RoutingError};
pub use profiles::{ProfileName, ProfileOverride, ProfileSet, RoutingProfile};
pub use request::{RouteOptions, RouteRequest};
pub use retry::{RetryConfig, RetryPolicy};
pub use scoring::{score_candidates, ConstraintViolation, Exclusion, ScoreBreakdown};

use crate::api::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::config::{OrchestratorConfig, RoutingConfig, UnknownProfilePolicy};
use crate::provider::{ProviderCaller, ProviderError};
use serde::Serialize;

/// One entry of a fallback chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedModel {
    pub model_id: String,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Output of one routing decision
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingResult {
    /// Primary first, then fallbacks in rank order
    pub chain: Vec<RankedModel>,
    /// Profile actually used
    pub profile: ProfileName,
    pub complexity: ComplexityAssessment,
    /// Candidates removed by availability or hard constraints
    pub excluded: Vec<Exclusion>,
    /// Candidates removed because their breaker refused traffic
    pub circuit_open: Vec<String>,
    pub routing_time_ms: f64,
}

impl RoutingResult {
    pub fn primary(&self) -> Option<&RankedModel> {
        self.chain.first()
    }

    pub fn fallbacks(&self) -> &[RankedModel] {
        self.chain.get(1..).unwrap_or(&[])
    }

    pub fn model_ids(&self) -> Vec<&str> {
        self.chain.iter().map(|m| m.model_id.as_str()).collect()
    }
}

/// Successful outcome of [`Router::execute`]
#[derive(Debug, Clone)]
pub struct Execution {
    pub response: ChatCompletionResponse,
    pub model_used: String,
    pub routing: RoutingResult,
    /// Failed calls made before the successful one
    pub attempts: Vec<AttemptRecord>,
}

impl Execution {
    /// The model that answered wasn't the primary selection
    pub fn was_fallback(&self) -> bool {
        self.routing
            .primary()
            .is_some_and(|p| p.model_id != self.model_used)
    }
}

/// Router selects and calls models for each request
pub struct Router {
    source: Arc<dyn CandidateSource>,
    breakers: Arc<CircuitBreakerRegistry>,
    profiles: ProfileSet,
    classifier: ComplexityClassifier,
    retry: RetryPolicy,
    unknown_profile: UnknownProfilePolicy,
    complexity_adjustment: bool,
    max_chain_length: Option<usize>,
}

impl Router {
    /// Router with built-in profiles and default retry and routing settings
    pub fn new(source: Arc<dyn CandidateSource>, breakers: Arc<CircuitBreakerRegistry>) -> Self {
        let routing = RoutingConfig::default();
        Self {
            source,
            breakers,
            profiles: ProfileSet::default(),
            classifier: ComplexityClassifier::default(),
            retry: RetryPolicy::default(),
            unknown_profile: routing.unknown_profile,
            complexity_adjustment: routing.complexity_adjustment,
            max_chain_length: routing.max_chain_length,
        }
    }

    /// Router configured from the `[routing]`, `[retry]`, `[circuit_breaker]`
    /// and `[profiles]` sections
    pub fn from_config(source: Arc<dyn CandidateSource>, config: &OrchestratorConfig) -> Self {
        let breakers = Arc::new(CircuitBreakerRegistry::new(&config.circuit_breaker));
        Self::new(source, breakers)
            .with_profiles(config.profile_set())
            .with_retry(RetryPolicy::from(&config.retry))
            .with_settings(&config.routing)
    }

    pub fn with_profiles(mut self, profiles: ProfileSet) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_settings(mut self, routing: &RoutingConfig) -> Self {
        self.unknown_profile = routing.unknown_profile;
        self.complexity_adjustment = routing.complexity_adjustment;
        self.max_chain_length = routing.max_chain_length;
        self
    }

    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    pub fn profiles(&self) -> &ProfileSet {
        &self.profiles
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Rank the current candidates for a request.
    ///
    /// # Errors
    ///
    /// `UnknownProfile` when the name is outside the profile set and the
    /// policy is to reject; `NoEligibleModel` when nothing survives
    /// constraints and breakers.
    pub fn route(
        &self,
        request: &RouteRequest,
        profile_name: &str,
    ) -> Result<RoutingResult, RoutingError> {
        self.route_with(request, profile_name, &RouteOptions::default())
    }

    /// [`Router::route`] with an excluded set or a pinned model.
    pub fn route_with(
        &self,
        request: &RouteRequest,
        profile_name: &str,
        options: &RouteOptions,
    ) -> Result<RoutingResult, RoutingError> {
        let start = Instant::now();

        let (profile_used, profile) = self.resolve_profile(profile_name)?;

        let complexity = self
            .classifier
            .classify_with_output(&request.prompt, request.max_tokens);
        let effective = if self.complexity_adjustment {
            profile.adjusted_for(complexity.tier)
        } else {
            profile.clone()
        };

        let mut candidates = self.source.list_candidates();
        if let Some(only) = &options.only {
            if !candidates.iter().any(|c| &c.id == only) {
                crate::metrics::record_routing_error("model_not_found");
                return Err(RoutingError::ModelNotFound {
                    model: only.clone(),
                });
            }
            candidates.retain(|c| &c.id == only);
        }
        candidates.retain(|c| !options.exclude.contains(&c.id));

        let outcome = score_candidates(&candidates, &effective);

        let mut chain = Vec::with_capacity(outcome.ranked.len());
        let mut circuit_open = Vec::new();
        for scored in outcome.ranked {
            if self.breakers.is_eligible(&scored.candidate.id) {
                chain.push(RankedModel {
                    model_id: scored.candidate.id,
                    score: scored.score,
                    breakdown: scored.breakdown,
                });
            } else {
                circuit_open.push(scored.candidate.id);
            }
        }
        if let Some(max) = self.max_chain_length {
            chain.truncate(max);
        }

        if chain.is_empty() {
            tracing::warn!(
                profile = %profile_used,
                excluded = outcome.excluded.len(),
                circuit_open = circuit_open.len(),
                "no eligible model"
            );
            crate::metrics::record_routing_error("no_eligible_model");
            return Err(RoutingError::NoEligibleModel {
                profile: profile_used.to_string(),
            });
        }

        let routing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            profile = %profile_used,
            tier = %complexity.tier,
            primary = %chain[0].model_id,
            chain_len = chain.len(),
            routing_time_ms,
            "routing decision"
        );
        crate::metrics::record_routing_decision(profile_used.as_str(), complexity.tier.as_str());

        Ok(RoutingResult {
            chain,
            profile: profile_used,
            complexity,
            excluded: outcome.excluded,
            circuit_open,
            routing_time_ms,
        })
    }

    fn resolve_profile(
        &self,
        profile_name: &str,
    ) -> Result<(ProfileName, &RoutingProfile), RoutingError> {
        match self.profiles.resolve(profile_name) {
            Ok(found) => Ok(found),
            Err(_) if self.unknown_profile == UnknownProfilePolicy::FallbackBalanced => {
                tracing::warn!(
                    requested = profile_name,
                    "unknown routing profile, using balanced"
                );
                Ok((
                    ProfileName::Balanced,
                    self.profiles.get(ProfileName::Balanced),
                ))
            }
            Err(e) => {
                crate::metrics::record_routing_error(e.kind());
                Err(e)
            }
        }
    }

    /// Route the request and call models down the fallback chain until one
    /// succeeds.
    ///
    /// Each model gets up to `max_attempts` calls with exponential backoff in
    /// between. Exhausting a model reports one failure to its breaker;
    /// success reports success. A model whose breaker refuses admission at
    /// call time is skipped. If this future is dropped mid-call, the model
    /// being called is charged a failure.
    ///
    /// # Errors
    ///
    /// Routing errors from [`Router::route`], or `AllModelsExhausted` with
    /// the full attempt history.
    pub async fn execute(
        &self,
        request: &ChatCompletionRequest,
        profile_name: &str,
        caller: &dyn ProviderCaller,
    ) -> Result<Execution, RoutingError> {
        self.execute_with(request, profile_name, caller, &RouteOptions::default())
            .await
    }

    /// [`Router::execute`] with an excluded set or a pinned model.
    pub async fn execute_with(
        &self,
        request: &ChatCompletionRequest,
        profile_name: &str,
        caller: &dyn ProviderCaller,
        options: &RouteOptions,
    ) -> Result<Execution, RoutingError> {
        let routing = self.route_with(&RouteRequest::from_request(request), profile_name, options)?;
        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for entry in &routing.chain {
            let Some(permit) = self.breakers.try_acquire(&entry.model_id) else {
                tracing::debug!(model_id = %entry.model_id, "breaker refused admission, skipping");
                continue;
            };

            match self
                .call_with_retries(&entry.model_id, request, caller, &mut attempts)
                .await
            {
                Ok(response) => {
                    permit.succeed();
                    let model_used = entry.model_id.clone();
                    if let Some(primary) = routing.primary() {
                        if primary.model_id != model_used {
                            tracing::info!(
                                from = %primary.model_id,
                                to = %model_used,
                                failed_attempts = attempts.len(),
                                "served by fallback model"
                            );
                            crate::metrics::record_fallback(&primary.model_id, &model_used);
                        }
                    }
                    return Ok(Execution {
                        response,
                        model_used,
                        routing,
                        attempts,
                    });
                }
                Err(()) => permit.fail(),
            }
        }

        if attempts.is_empty() {
            // Every breaker refused admission between routing and calling
            crate::metrics::record_routing_error("no_eligible_model");
            return Err(RoutingError::NoEligibleModel {
                profile: routing.profile.to_string(),
            });
        }

        tracing::warn!(
            profile = %routing.profile,
            attempts = ?attempts,
            "all models exhausted"
        );
        crate::metrics::record_routing_error("all_models_exhausted");
        Err(RoutingError::AllModelsExhausted { attempts })
    }

    async fn call_with_retries(
        &self,
        model_id: &str,
        request: &ChatCompletionRequest,
        caller: &dyn ProviderCaller,
        attempts: &mut Vec<AttemptRecord>,
    ) -> Result<ChatCompletionResponse, ()> {
        let timeout = self.retry.attempt_timeout;
        for attempt in 1..=self.retry.max_attempts {
            let started = Instant::now();
            let result = match tokio::time::timeout(timeout, caller.call(model_id, request, timeout))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(timeout.as_millis() as u64)),
            };
            let elapsed = started.elapsed();

            match result {
                Ok(response) => {
                    crate::metrics::record_attempt(model_id, "success", elapsed);
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        model_id,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        error = %e,
                        "provider call failed"
                    );
                    crate::metrics::record_attempt(model_id, e.kind(), elapsed);
                    attempts.push(AttemptRecord {
                        model_id: model_id.to_string(),
                        attempt,
                        error: e.to_string(),
                    });
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.backoff(attempt)).await;
                    }
                }
            }
        }
        Err(())
    }
}
