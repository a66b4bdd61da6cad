//! Logging helpers
//!
//! Filter construction for `tracing-subscriber` and request correlation ids.

use uuid::Uuid;

/// Build filter directives string from LoggingConfig
///
/// Component levels are emitted in sorted order so the result is stable.
///
/// # Examples
///
/// ```
/// use orchestrator::config::{LogFormat, LoggingConfig};
/// use orchestrator::logging::build_filter_directives;
/// use std::collections::HashMap;
///
/// let mut component_levels = HashMap::new();
/// component_levels.insert("routing".to_string(), "debug".to_string());
///
/// let config = LoggingConfig {
///     level: "info".to_string(),
///     format: LogFormat::Pretty,
///     component_levels: Some(component_levels),
/// };
///
/// assert_eq!(build_filter_directives(&config), "info,orchestrator::routing=debug");
/// ```
pub fn build_filter_directives(config: &crate::config::LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    if let Some(component_levels) = &config.component_levels {
        let mut components: Vec<_> = component_levels.iter().collect();
        components.sort();
        for (component, level) in components {
            filter_str.push_str(&format!(",orchestrator::{}={}", component, level));
        }
    }

    filter_str
}

/// Generate a new request ID using UUID v4
///
/// Used to correlate every attempt and fallback made for one request.
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
