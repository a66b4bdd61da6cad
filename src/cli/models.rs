//! Models command implementation

use crate::cli::output::{format_models_json, format_models_table, ModelView};
use crate::cli::{load_config, ModelsArgs};

/// Handle `orchestrator models` command
pub fn handle_models(args: &ModelsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    let registry = config.model_registry()?;
    let views: Vec<ModelView> = registry.list_models().iter().map(ModelView::from).collect();

    if args.json {
        Ok(format_models_json(&views))
    } else if views.is_empty() {
        Ok("No models configured. Add [[models]] entries to the config file.".to_string())
    } else {
        Ok(format_models_table(&views))
    }
}
