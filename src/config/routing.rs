//! Routing configuration

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::routing::ProfileName;

/// What to do when a request names a profile outside the built-in set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownProfilePolicy {
    /// Fail with an unknown-profile error
    #[default]
    Reject,
    /// Route with `balanced` instead
    FallbackBalanced,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    /// Profile used when a request doesn't name one
    pub default_profile: String,
    pub unknown_profile: UnknownProfilePolicy,
    /// Let the complexity tier nudge profile weights
    pub complexity_adjustment: bool,
    /// Upper bound on the fallback chain length
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chain_length: Option<usize>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_profile: ProfileName::Balanced.to_string(),
            unknown_profile: UnknownProfilePolicy::Reject,
            complexity_adjustment: true,
            max_chain_length: None,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_profile.parse::<ProfileName>().is_err() {
            return Err(ConfigError::Validation {
                field: "routing.default_profile".to_string(),
                message: format!("unknown profile '{}'", self.default_profile),
            });
        }
        if self.max_chain_length == Some(0) {
            return Err(ConfigError::Validation {
                field: "routing.max_chain_length".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
