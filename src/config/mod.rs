//! Configuration module
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`ORCHESTRATOR_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use orchestrator::config::OrchestratorConfig;
//!
//! let config = OrchestratorConfig::default();
//! assert_eq!(config.server.port, 8000);
//! assert_eq!(config.circuit_breaker.failure_threshold, 3);
//!
//! let toml = r#"
//! [server]
//! port = 9000
//! "#;
//! let config: OrchestratorConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! ```

pub mod error;
pub mod logging;
pub mod models;
pub mod routing;
pub mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use models::ModelConfig;
pub use routing::{RoutingConfig, UnknownProfilePolicy};
pub use server::ServerConfig;

pub use crate::routing::circuit_breaker::CircuitBreakerConfig;
pub use crate::routing::profiles::ProfileOverrides;
pub use crate::routing::retry::RetryConfig;

use crate::registry::{ModelRegistry, RegisteredModel};
use crate::routing::{ProfileName, ProfileSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Unified configuration for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Profile policy and chain shaping
    pub routing: RoutingConfig,
    /// Per-model breaker thresholds
    pub circuit_breaker: CircuitBreakerConfig,
    /// Per-model retry and backoff
    pub retry: RetryConfig,
    /// Overrides for the built-in profiles
    pub profiles: ProfileOverrides,
    /// Static model registry
    pub models: Vec<ModelConfig>,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl OrchestratorConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports ORCHESTRATOR_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        // Server settings
        if let Ok(port) = std::env::var("ORCHESTRATOR_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("ORCHESTRATOR_HOST") {
            self.server.host = host;
        }

        // Logging settings
        if let Ok(level) = std::env::var("ORCHESTRATOR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ORCHESTRATOR_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        // Routing settings
        if let Ok(profile) = std::env::var("ORCHESTRATOR_DEFAULT_PROFILE") {
            if profile.parse::<ProfileName>().is_ok() {
                self.routing.default_profile = profile;
            }
        }
        if let Ok(threshold) = std::env::var("ORCHESTRATOR_FAILURE_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                self.circuit_breaker.failure_threshold = t;
            }
        }
        if let Ok(cooldown) = std::env::var("ORCHESTRATOR_COOLDOWN_SECONDS") {
            if let Ok(c) = cooldown.parse() {
                self.circuit_breaker.cooldown_seconds = c;
            }
        }
        if let Ok(attempts) = std::env::var("ORCHESTRATOR_MAX_ATTEMPTS") {
            if let Ok(a) = attempts.parse() {
                self.retry.max_attempts = a;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        self.routing.validate()?;

        self.logging
            .validate()
            .map_err(|(field, message)| ConfigError::Validation { field, message })?;

        if self.circuit_breaker.failure_threshold == 0 {
            return Err(ConfigError::Validation {
                field: "circuit_breaker.failure_threshold".to_string(),
                message: "threshold must be at least 1".to_string(),
            });
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Validation {
                field: "retry.max_attempts".to_string(),
                message: "at least one attempt is required".to_string(),
            });
        }
        if self.retry.backoff_multiplier.is_nan() || self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::Validation {
                field: "retry.backoff_multiplier".to_string(),
                message: "multiplier must be >= 1.0".to_string(),
            });
        }
        if self.retry.attempt_timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "retry.attempt_timeout_seconds".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }

        for (name, profile) in self.profile_set().iter() {
            profile
                .validate()
                .map_err(|message| ConfigError::Validation {
                    field: format!("profiles.{}", name),
                    message,
                })?;
        }

        let mut seen = HashSet::new();
        for (i, model) in self.models.iter().enumerate() {
            model
                .validate(i)
                .map_err(|(field, message)| ConfigError::Validation { field, message })?;
            if !seen.insert(model.id.as_str()) {
                return Err(ConfigError::Validation {
                    field: format!("models[{}].id", i),
                    message: format!("duplicate model id '{}'", model.id),
                });
            }
        }

        Ok(())
    }

    /// Built-in profiles with `[profiles.*]` overrides applied
    pub fn profile_set(&self) -> ProfileSet {
        ProfileSet::with_overrides(&self.profiles)
    }

    /// Registry seeded from `[[models]]`
    pub fn model_registry(&self) -> Result<ModelRegistry, ConfigError> {
        ModelRegistry::from_models(self.models.iter().map(RegisteredModel::from)).map_err(|e| {
            ConfigError::Validation {
                field: "models".to_string(),
                message: e.to_string(),
            }
        })
    }
}
