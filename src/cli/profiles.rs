//! Profiles command implementation

use crate::cli::output::{format_profiles_json, format_profiles_table, profile_views};
use crate::cli::{load_config, ProfilesArgs};

/// Handle `orchestrator profiles` command
pub fn handle_profiles(args: &ProfilesArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let views = profile_views(&config.profile_set());
    let default_profile = &config.routing.default_profile;

    if args.json {
        Ok(format_profiles_json(&views, default_profile))
    } else {
        Ok(format_profiles_table(&views, default_profile))
    }
}
