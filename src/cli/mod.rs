//! CLI module for the orchestrator
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `route` - Rank the configured models for a prompt, offline
//! - `profiles` - Show the routing profiles
//! - `models` - List the configured models
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! orchestrator serve
//!
//! # Which model would answer this under the budget profile?
//! orchestrator route "Summarize this paragraph" --profile budget
//!
//! # Generate shell completions
//! orchestrator completions bash > ~/.bash_completion.d/orchestrator
//! ```

pub mod completions;
pub mod config;
pub mod models;
pub mod output;
pub mod profiles;
pub mod route;
pub mod serve;

pub use completions::handle_completions;
pub use config::{handle_config_init, load_config};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file name
pub const DEFAULT_CONFIG: &str = "orchestrator.toml";

/// Profile-weighted LLM routing with per-model circuit breakers
#[derive(Parser, Debug)]
#[command(
    name = "orchestrator",
    version,
    about = "Profile-weighted LLM routing with per-model circuit breakers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Rank configured models for a prompt without calling them
    Route(RouteArgs),
    /// Show routing profiles
    Profiles(ProfilesArgs),
    /// List configured models
    Models(ModelsArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "ORCHESTRATOR_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "ORCHESTRATOR_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "ORCHESTRATOR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Default routing profile for requests that name none
    #[arg(long)]
    pub default_profile: Option<String>,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Prompt to classify and route
    pub prompt: String,

    /// Routing profile (quality, balanced, speed, budget, long_context)
    #[arg(short, long, default_value = "balanced")]
    pub profile: String,

    /// Requested output length, as `max_tokens`
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ProfilesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["orchestrator", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.config, PathBuf::from("orchestrator.toml"));
                assert!(args.default_profile.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["orchestrator", "serve", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.port, Some(9000)),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_serve_with_config() {
        let cli = Cli::try_parse_from(["orchestrator", "serve", "-c", "custom.toml"]).unwrap();
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.config, PathBuf::from("custom.toml")),
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_parse_route() {
        let cli = Cli::try_parse_from([
            "orchestrator",
            "route",
            "Explain monads",
            "--profile",
            "quality",
            "--max-tokens",
            "2048",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Route(args) => {
                assert_eq!(args.prompt, "Explain monads");
                assert_eq!(args.profile, "quality");
                assert_eq!(args.max_tokens, Some(2048));
                assert!(args.json);
            }
            _ => panic!("Expected Route command"),
        }
    }

    #[test]
    fn test_cli_parse_route_default_profile() {
        let cli = Cli::try_parse_from(["orchestrator", "route", "hi"]).unwrap();
        match cli.command {
            Commands::Route(args) => assert_eq!(args.profile, "balanced"),
            _ => panic!("Expected Route command"),
        }
    }

    #[test]
    fn test_cli_parse_profiles_and_models() {
        let cli = Cli::try_parse_from(["orchestrator", "profiles", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Profiles(ref a) if a.json));
        let cli = Cli::try_parse_from(["orchestrator", "models"]).unwrap();
        assert!(matches!(cli.command, Commands::Models(_)));
    }

    #[test]
    fn test_cli_parse_config_init() {
        let cli =
            Cli::try_parse_from(["orchestrator", "config", "init", "-o", "x.toml", "--force"])
                .unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init(args)) => {
                assert_eq!(args.output, PathBuf::from("x.toml"));
                assert!(args.force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }
}
