//! Model management commands

use anyhow::Result;
use serde_json::Value;

use crate::client::{ApiClient, RetrainRequest, RetrainResponse};
use crate::output::{color_status, print_success, OutputFormat};

/// Trigger a retrain on the server
pub async fn retrain(
    client: &ApiClient,
    data_path: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let response: RetrainResponse = client
        .post("retrain", &RetrainRequest { data_path })
        .await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print_success(&response.message);
            println!("  Accuracy: {:.3}", response.accuracy);
            println!("  Strategy: {}", response.strategy);
            println!("  Status:   {}", color_status(&response.status));
        }
    }

    Ok(())
}

/// Show the active strategy and feature contract
pub async fn info(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let response: Value = client.get("model/info").await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            let status = response["status"].as_str().unwrap_or("unknown");
            println!("Status:   {}", color_status(status));
            if let Some(strategy) = response["strategy"].as_str() {
                println!("Strategy: {}", strategy);
            }
            if let Some(names) = response["feature_names"].as_array() {
                println!("Features ({}):", names.len());
                for name in names {
                    if let Some(name) = name.as_str() {
                        println!("  - {}", name);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Show server health and readiness
pub async fn health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: Value = client.get("healthz").await?;
    let readiness: Value = client.get("readyz").await?;

    match format {
        OutputFormat::Json => {
            let combined = serde_json::json!({
                "health": health,
                "readiness": readiness,
            });
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
        OutputFormat::Text => {
            let status = health["status"].as_str().unwrap_or("unknown");
            println!("Status: {}", color_status(status));
            println!("Ready:  {}", readiness["ready"].as_bool().unwrap_or(false));
            if let Some(components) = health["components"].as_object() {
                for (name, component) in components {
                    let component_status = component["status"].as_str().unwrap_or("unknown");
                    let message = component["message"].as_str().unwrap_or("");
                    println!("  {}: {} {}", name, color_status(component_status), message);
                }
            }
        }
    }

    Ok(())
}
