//! Model orchestrator - profile-weighted LLM routing
//!
//! Classifies each request's complexity, scores the registered models
//! under a routing profile, and calls them down a ranked fallback chain
//! while per-model circuit breakers keep failing providers out of rotation.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod provider;
pub mod registry;
pub mod routing;
