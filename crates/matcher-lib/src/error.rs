//! Error taxonomy for the model layer
//!
//! Dataset and artifact failures are surfaced to the caller so operators can
//! react; scoring faults are recovered close to where they occur and the
//! process keeps serving.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Prediction requested from a strategy that has no fitted state.
    #[error("model has not been trained")]
    NotTrained,

    /// Training dataset missing, unreadable or structurally invalid.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Persisted artifact missing, corrupt or inconsistent with the feature
    /// contract.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Unexpected failure inside a scoring computation.
    #[error("scoring fault: {0}")]
    Scoring(String),
}

impl ModelError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        ModelError::Dataset(msg.into())
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        ModelError::Artifact(msg.into())
    }

    pub fn scoring(msg: impl Into<String>) -> Self {
        ModelError::Scoring(msg.into())
    }
}
