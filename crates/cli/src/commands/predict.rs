//! Prediction command

use anyhow::Result;

use crate::client::{ApiClient, PredictRequest, PredictResponse};
use crate::output::{color_confidence, print_info, print_success, print_warning, OutputFormat};

/// Request a prediction and print the outcome
pub async fn predict(
    client: &ApiClient,
    request: PredictRequest,
    format: OutputFormat,
) -> Result<()> {
    let response: PredictResponse = client.post("predict", &request).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            if response.is_suitable {
                print_success(&response.message);
            } else {
                print_warning(&response.message);
            }
            println!("  Suitable:    {}", response.is_suitable);
            println!("  Confidence:  {}", color_confidence(response.confidence));
            println!("  Probability: {:.3}", response.probability_suitable);
            println!("  Strategy:    {}", response.strategy);
            if response.fallback_used {
                print_info("Answered by the rule scorer after a strategy fault");
            }
        }
    }

    Ok(())
}
