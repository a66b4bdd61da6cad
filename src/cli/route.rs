//! Route command implementation
//!
//! Runs the same routing decision the server would make, against the
//! configured registry, without calling any provider. Breakers start CLOSED.

use crate::cli::output::{format_route_json, format_route_table};
use crate::cli::{load_config, RouteArgs};
use crate::routing::{CandidateSource, RouteRequest, Router};
use std::sync::Arc;

/// Handle `orchestrator route` command
pub fn handle_route(args: &RouteArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let source: Arc<dyn CandidateSource> = Arc::new(config.model_registry()?);
    let router = Router::from_config(source, &config);

    let request = RouteRequest {
        prompt: args.prompt.clone(),
        max_tokens: args.max_tokens,
    };
    let result = router.route(&request, &args.profile)?;

    if args.json {
        Ok(format_route_json(&result))
    } else {
        Ok(format_route_table(&result))
    }
}
