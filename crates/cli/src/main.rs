//! Volunteer Suitability CLI
//!
//! A command-line tool for requesting predictions, retraining the model,
//! and inspecting the suitability service.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use client::{PredictRequest, ProjectPayload, VolunteerPayload};

/// Volunteer Suitability CLI
#[derive(Parser)]
#[command(name = "matcher")]
#[command(author, version, about = "CLI for the volunteer suitability service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via MATCHER_API_URL env var)
    #[arg(long, env = "MATCHER_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "text")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a volunteer against a project
    Predict {
        #[command(flatten)]
        volunteer: VolunteerArgs,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Retrain the model from a CSV dataset
    Retrain {
        /// Dataset path on the server (uses the server default if omitted)
        #[arg(long)]
        data_path: Option<String>,
    },

    /// Show the active strategy and feature contract
    Info,

    /// Show server health and readiness
    Health,
}

#[derive(Args)]
pub struct VolunteerArgs {
    /// Reliability rating (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub reliability: f64,

    /// Punctuality rating (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub punctuality: f64,

    /// Task quality rating (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub task_quality: f64,

    /// Historical success rate (0-1)
    #[arg(long, default_value_t = 0.0)]
    pub success_rate: f64,

    /// Total projects joined
    #[arg(long, default_value_t = 0)]
    pub total_projects: u32,

    /// Projects completed
    #[arg(long, default_value_t = 0)]
    pub completed_projects: u32,

    /// Total volunteered hours
    #[arg(long, default_value_t = 0.0)]
    pub total_hours: f64,

    /// Weekly hours available
    #[arg(long, default_value_t = 0.0)]
    pub availability_hours: f64,
}

#[derive(Args)]
pub struct ProjectArgs {
    /// Project duration in weeks
    #[arg(long, default_value_t = 0.0)]
    pub project_duration: f64,

    /// Project complexity (0-10)
    #[arg(long, default_value_t = 0.0)]
    pub project_complexity: f64,

    /// Weekly hours the project requires
    #[arg(long, default_value_t = 0.0)]
    pub required_hours: f64,
}

impl From<VolunteerArgs> for VolunteerPayload {
    fn from(args: VolunteerArgs) -> Self {
        Self {
            reliability: args.reliability,
            punctuality: args.punctuality,
            task_quality: args.task_quality,
            success_rate: args.success_rate,
            total_projects: args.total_projects,
            completed_projects: args.completed_projects,
            total_hours: args.total_hours,
            availability_hours: args.availability_hours,
        }
    }
}

impl From<ProjectArgs> for ProjectPayload {
    fn from(args: ProjectArgs) -> Self {
        Self {
            project_duration: args.project_duration,
            project_complexity: args.project_complexity,
            required_hours: args.required_hours,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize client
    let client = client::ApiClient::new(&cli.api_url)?;

    // Execute command
    match cli.command {
        Commands::Predict { volunteer, project } => {
            let request = PredictRequest {
                volunteer: volunteer.into(),
                project: project.into(),
            };
            commands::predict::predict(&client, request, cli.format).await?;
        }
        Commands::Retrain { data_path } => {
            commands::model::retrain(&client, data_path, cli.format).await?;
        }
        Commands::Info => {
            commands::model::info(&client, cli.format).await?;
        }
        Commands::Health => {
            commands::model::health(&client, cli.format).await?;
        }
    }

    Ok(())
}
