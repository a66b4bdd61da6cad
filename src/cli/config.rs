//! Config command handlers

use crate::cli::ConfigInitArgs;
use crate::config::OrchestratorConfig;
use std::fs;
use std::path::Path;

const EXAMPLE_CONFIG: &str = include_str!("../../orchestrator.example.toml");

/// Load the file when present (defaults otherwise), apply `ORCHESTRATOR_*`
/// overrides and validate.
pub fn load_config(path: &Path) -> Result<OrchestratorConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        OrchestratorConfig::load(Some(path))?
    } else {
        tracing::debug!(path = %path.display(), "Config file not found, using defaults");
        OrchestratorConfig::default()
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Handle `orchestrator config init` command
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    fs::write(&args.output, EXAMPLE_CONFIG)?;

    println!("✓ Configuration file created: {}", args.output.display());
    println!("  Edit the [[models]] entries to point at your providers.");

    Ok(())
}
