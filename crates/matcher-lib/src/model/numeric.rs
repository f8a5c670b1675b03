//! Numeric-only fallback tier
//!
//! Active when the trainable classifier cannot be constructed. Runs the full
//! feature derivation for every call so the feature contract stays exercised,
//! then scores with the deterministic rule formula. Training is a validated
//! no-op that reports the nominal accuracy; the persisted artifact is the
//! metadata record alone.

use crate::artifact;
use crate::error::ModelError;
use crate::model::features;
use crate::model::rules::{RuleScorer, NOMINAL_ACCURACY};
use crate::models::{PredictionResult, ProjectRecord, VolunteerRecord};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

pub const MODEL_TYPE: &str = "numeric_fallback";

/// Numeric fallback strategy.
pub struct NumericModel {
    artifact_dir: PathBuf,
    scorer: RuleScorer,
    trained: AtomicBool,
}

impl NumericModel {
    pub fn new(artifact_dir: &Path) -> Self {
        Self {
            artifact_dir: artifact_dir.to_path_buf(),
            scorer: RuleScorer::new(),
            trained: AtomicBool::new(false),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained.load(Ordering::Relaxed)
    }

    /// Derive the feature vector, then score with the rule formula.
    /// Never fails; the scorer recovers locally from any fault.
    pub fn predict(
        &self,
        volunteer: &VolunteerRecord,
        project: &ProjectRecord,
    ) -> PredictionResult {
        let vector = features::derive(volunteer, project);
        debug!(
            completion_rate = vector.get("completion_rate"),
            availability_ratio = vector.get("availability_ratio"),
            "derived features for numeric scoring"
        );
        self.scorer.predict(volunteer, project)
    }

    /// Mark the strategy trained and report the nominal accuracy.
    ///
    /// The dataset has already been validated by the selector; there is no
    /// model to fit at this tier.
    pub fn train(&self) -> f64 {
        self.trained.store(true, Ordering::Relaxed);
        NOMINAL_ACCURACY
    }

    /// Persist the metadata-only artifact.
    pub fn save(&self) -> Result<(), ModelError> {
        artifact::save_metadata(&self.artifact_dir, MODEL_TYPE)
    }

    /// Restore the trained flag from a metadata artifact, when one exists.
    pub fn load(&self) -> Result<bool, ModelError> {
        if !self.artifact_dir.join(artifact::METADATA_FILE).exists() {
            return Ok(false);
        }
        let metadata = artifact::load_metadata(&self.artifact_dir)?;
        self.trained.store(metadata.is_trained, Ordering::Relaxed);
        Ok(metadata.is_trained)
    }
}
