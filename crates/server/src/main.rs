//! Suitability server - volunteer/project match prediction service
//!
//! Serves predictions over HTTP using the strongest scoring strategy the
//! runtime supports, degrading gracefully when the trainable classifier or
//! its persisted artifact is unavailable.

use anyhow::Result;
use matcher_lib::{
    health::{components, HealthRegistry},
    MatcherMetrics, ModelSelector, StructuredLogger,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use suitability_server::{api, config};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting suitability-server");

    // Load configuration
    let config = config::ServerConfig::load()?;
    info!(service = %config.service_name, artifact_dir = %config.artifact_dir, "Server configured");

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODEL).await;
    health_registry.register(components::ARTIFACT_STORE).await;

    // Initialize metrics and structured logger
    let metrics = MatcherMetrics::new();
    let logger = StructuredLogger::new(&config.service_name);

    // Select the scoring strategy once for the process lifetime
    let selector = Arc::new(ModelSelector::initialize(
        Path::new(&config.artifact_dir),
        config.strategy,
    ));
    logger.log_startup(SERVER_VERSION, selector.strategy_kind());

    // Try to restore a persisted artifact; a failed load degrades health
    // but the process keeps serving with whatever tier remains usable.
    let load_outcome = selector.load();
    match &load_outcome {
        Ok(true) => logger.log_artifact_load(true, &config.artifact_dir),
        Ok(false) => logger.log_artifact_load(false, "no persisted artifact found"),
        Err(e) => logger.log_artifact_load(false, &e.to_string()),
    }
    health_registry.set_artifact_state(&load_outcome).await;
    health_registry
        .set_model_state(selector.strategy_kind(), selector.is_trained())
        .await;

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics.clone(),
        logger.clone(),
        selector,
        PathBuf::from(&config.dataset_path),
    ));

    // Mark service as ready after initialization
    health_registry.set_ready(true).await;

    // Start the API server
    let _api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
