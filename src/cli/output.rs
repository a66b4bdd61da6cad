//! Output formatting helpers for CLI commands

use crate::registry::RegisteredModel;
use crate::routing::{ProfileName, ProfileSet, RoutingResult};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for model display
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelView {
    pub id: String,
    pub provider: Option<String>,
    pub quality: f64,
    pub latency_ms: f64,
    pub cost_per_million: f64,
    pub context_window: Option<u32>,
    pub available: bool,
}

impl From<&RegisteredModel> for ModelView {
    fn from(model: &RegisteredModel) -> Self {
        Self {
            id: model.candidate.id.clone(),
            provider: model.provider.clone(),
            quality: model.candidate.quality,
            latency_ms: model.candidate.latency_ms,
            cost_per_million: model.candidate.cost_per_million,
            context_window: model.candidate.context_window,
            available: model.candidate.available,
        }
    }
}

/// View model for profile display
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProfileView {
    pub name: ProfileName,
    pub description: &'static str,
    pub quality: f64,
    pub latency: f64,
    pub cost: f64,
    pub context: f64,
    pub constraints: Vec<String>,
}

pub fn profile_views(profiles: &ProfileSet) -> Vec<ProfileView> {
    profiles
        .iter()
        .map(|(name, profile)| {
            let weights = profile.normalized_weights();
            let mut constraints = Vec::new();
            if let Some(q) = profile.min_quality {
                constraints.push(format!("quality >= {}", q));
            }
            if let Some(l) = profile.max_latency_ms {
                constraints.push(format!("latency <= {}ms", l));
            }
            if let Some(c) = profile.max_cost_per_million {
                constraints.push(format!("cost <= ${}/M", c));
            }
            if let Some(w) = profile.min_context_window {
                constraints.push(format!("context >= {}", w));
            }
            ProfileView {
                name,
                description: name.description(),
                quality: weights.quality,
                latency: weights.latency,
                cost: weights.cost,
                context: weights.context,
                constraints,
            }
        })
        .collect()
}

fn to_pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Format models as a table
pub fn format_models_table(models: &[ModelView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Model", "Provider", "Quality", "Latency", "Cost/M", "Context", "Status",
    ]);

    for m in models {
        let status = if m.available {
            "Available".green().to_string()
        } else {
            "Unavailable".red().to_string()
        };
        table.add_row(vec![
            Cell::new(&m.id),
            Cell::new(m.provider.as_deref().unwrap_or("-")),
            Cell::new(format!("{:.2}", m.quality)),
            Cell::new(format!("{}ms", m.latency_ms)),
            Cell::new(format!("${:.2}", m.cost_per_million)),
            Cell::new(
                m.context_window
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(status),
        ]);
    }

    table.to_string()
}

/// Format models as JSON
pub fn format_models_json(models: &[ModelView]) -> String {
    to_pretty_json(&json!({ "models": models }))
}

/// Format profiles as a table
pub fn format_profiles_table(profiles: &[ProfileView], default_profile: &str) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Profile",
        "Quality",
        "Latency",
        "Cost",
        "Context",
        "Constraints",
    ]);

    for p in profiles {
        let name = if p.name.as_str() == default_profile {
            format!("{} (default)", p.name).bold().to_string()
        } else {
            p.name.to_string()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.2}", p.quality)),
            Cell::new(format!("{:.2}", p.latency)),
            Cell::new(format!("{:.2}", p.cost)),
            Cell::new(format!("{:.2}", p.context)),
            Cell::new(if p.constraints.is_empty() {
                "-".to_string()
            } else {
                p.constraints.join(", ")
            }),
        ]);
    }

    table.to_string()
}

/// Format profiles as JSON
pub fn format_profiles_json(profiles: &[ProfileView], default_profile: &str) -> String {
    to_pretty_json(&json!({
        "default_profile": default_profile,
        "profiles": profiles,
    }))
}

/// Format a routing decision as a summary line plus a ranked table
pub fn format_route_table(result: &RoutingResult) -> String {
    let mut out = format!(
        "Profile: {}  Complexity: {} (score {:.0}, confidence {:.2})\n",
        result.profile.to_string().bold(),
        result.complexity.tier,
        result.complexity.score,
        result.complexity.confidence,
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Rank", "Model", "Score", "Quality", "Latency", "Cost", "Context",
    ]);
    for (i, m) in result.chain.iter().enumerate() {
        let model = if i == 0 {
            m.model_id.green().to_string()
        } else {
            m.model_id.clone()
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(model),
            Cell::new(format!("{:.3}", m.score)),
            Cell::new(format!("{:.2}", m.breakdown.quality)),
            Cell::new(format!("{:.2}", m.breakdown.latency)),
            Cell::new(format!("{:.2}", m.breakdown.cost)),
            Cell::new(format!("{:.2}", m.breakdown.context)),
        ]);
    }
    out.push_str(&table.to_string());

    for exclusion in &result.excluded {
        out.push_str(&format!(
            "\n{} {}: {}",
            "excluded".yellow(),
            exclusion.model_id,
            exclusion.violation
        ));
    }
    for model_id in &result.circuit_open {
        out.push_str(&format!("\n{} {}", "circuit open".red(), model_id));
    }
    out
}

/// Format a routing decision as JSON
pub fn format_route_json(result: &RoutingResult) -> String {
    serde_json::to_value(result)
        .map(|v| to_pretty_json(&v))
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}
