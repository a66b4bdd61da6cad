//! Logging configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Pretty-printed logs for humans
    #[default]
    Pretty,
    /// JSON logs for machine parsing
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Modules that accept a `component_levels` entry
pub const LOG_COMPONENTS: &[&str] = &[
    "api", "cli", "config", "metrics", "provider", "registry", "routing",
];

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels, e.g. `routing = "debug"` to trace every ranking
    /// and breaker transition without raising the global level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}

fn parse_level(level: &str) -> Result<(), String> {
    if level.eq_ignore_ascii_case("off") {
        return Ok(());
    }
    tracing::Level::from_str(level)
        .map(|_| ())
        .map_err(|_| format!("unknown level '{}'", level))
}

impl LoggingConfig {
    /// Check the global level and every component entry.
    ///
    /// Returns the offending key and a message on failure.
    pub fn validate(&self) -> Result<(), (String, String)> {
        parse_level(&self.level).map_err(|m| ("logging.level".to_string(), m))?;

        if let Some(levels) = &self.component_levels {
            for (component, level) in levels {
                let field = format!("logging.component_levels.{}", component);
                if !LOG_COMPONENTS.contains(&component.as_str()) {
                    return Err((
                        field,
                        format!("unknown component, expected one of {}", LOG_COMPONENTS.join(", ")),
                    ));
                }
                parse_level(level).map_err(|m| (field, m))?;
            }
        }
        Ok(())
    }
}
