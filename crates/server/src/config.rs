//! Server configuration

use anyhow::Result;
use matcher_lib::StrategyKind;
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Service name used in structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding the persisted model artifact
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,

    /// Default training dataset used when a retrain request names no path
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Pin a scoring strategy instead of running the capability cascade
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
}

fn default_service_name() -> String {
    "suitability-server".to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_artifact_dir() -> String {
    "models".to_string()
}

fn default_dataset_path() -> String {
    "data/training_data.csv".to_string()
}

impl ServerConfig {
    fn defaults() -> Self {
        Self {
            service_name: default_service_name(),
            api_port: default_api_port(),
            artifact_dir: default_artifact_dir(),
            dataset_path: default_dataset_path(),
            strategy: None,
        }
    }

    /// Load configuration from the environment
    ///
    /// A malformed `MATCHER_*` variable falls back to the defaults, loudly:
    /// every variable is discarded, so the warning names the parse error.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("MATCHER"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid MATCHER_* environment, using default configuration");
            Self::defaults()
        }))
    }
}
