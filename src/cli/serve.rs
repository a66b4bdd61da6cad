//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{LogFormat, OrchestratorConfig};
use crate::routing::ProfileName;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<OrchestratorConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        OrchestratorConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        OrchestratorConfig::default()
    };

    config = config.with_env_overrides();

    // CLI flags win over env and file
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(ref profile) = args.default_profile {
        profile.parse::<ProfileName>()?;
        config.routing.default_profile = profile.clone();
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {}
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    init_tracing(&config.logging)?;

    tracing::info!("Starting orchestrator");
    tracing::debug!(?config, "Loaded configuration");

    let state = Arc::new(
        AppState::from_config(Arc::new(config.clone())).map_err(|e| e.to_string())?,
    );
    tracing::info!(
        models = state.registry.model_count(),
        default_profile = %config.routing.default_profile,
        failure_threshold = config.circuit_breaker.failure_threshold,
        cooldown_seconds = config.circuit_breaker.cooldown_seconds,
        "Model registry loaded"
    );
    if state.registry.model_count() == 0 {
        tracing::warn!("No models configured; every request will fail with no eligible model");
    }

    let app = create_router(Arc::clone(&state));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Orchestrator API server listening");

    let cancel_token = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    tracing::info!("Orchestrator stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn args(config: PathBuf) -> ServeArgs {
        ServeArgs {
            config,
            port: None,
            host: None,
            log_level: None,
            default_profile: None,
        }
    }

    #[test]
    fn test_serve_config_loading() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nrequest_timeout_seconds = 42").unwrap();

        let config = load_config_with_overrides(&args(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.server.request_timeout_seconds, 42);
    }

    #[test]
    fn test_serve_cli_overrides_config() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080").unwrap();

        let mut serve_args = args(temp.path().to_path_buf());
        serve_args.port = Some(9000);
        serve_args.default_profile = Some("speed".to_string());

        let config = load_config_with_overrides(&serve_args).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.routing.default_profile, "speed");
    }

    #[test]
    fn test_serve_rejects_unknown_default_profile() {
        let mut serve_args = args(PathBuf::from("nonexistent.toml"));
        serve_args.default_profile = Some("turbo".to_string());
        assert!(load_config_with_overrides(&serve_args).is_err());
    }

    #[test]
    fn test_serve_works_without_config_file() {
        let config = load_config_with_overrides(&args(PathBuf::from("nonexistent.toml"))).unwrap();
        assert!(config.models.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_signal_returns_when_cancelled() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), shutdown_signal(cancel)).await;
        assert!(result.is_ok(), "Shutdown didn't trigger");
        handle.await.unwrap();
    }
}
