//! Matcher library for volunteer/project suitability prediction
//!
//! This crate provides the core functionality for:
//! - Feature derivation from volunteer and project records
//! - Interchangeable scoring strategies with graceful degradation
//! - Training-dataset loading and stratified splitting
//! - Atomic model-artifact persistence
//! - Health checks and observability

pub mod artifact;
pub mod dataset;
pub mod error;
pub mod health;
pub mod model;
pub mod models;
pub mod observability;

pub use error::ModelError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use model::{ModelSelector, RuleScorer, NOMINAL_ACCURACY, SUITABILITY_THRESHOLD};
pub use models::*;
pub use observability::{MatcherMetrics, StructuredLogger};
