//! Trainable tier: bagged decision-tree ensemble
//!
//! Wraps a bootstrap-aggregated ensemble of linfa decision trees behind the
//! suitability contract. The fitted classifier and its scaler are replaced
//! as one value under a write lock; in-flight predictions keep reading the
//! previous pair until the swap.

use crate::artifact;
use crate::dataset::TrainingData;
use crate::error::ModelError;
use crate::model::features::{self, NUM_FEATURES};
use crate::model::scaler::StandardScaler;
use crate::models::{PredictionResult, ProjectRecord, VolunteerRecord};
use linfa::prelude::*;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Instant;
use tracing::{debug, info};

pub const MODEL_TYPE: &str = "decision_tree_ensemble";

/// Fewer rows than this cannot produce a meaningful held-out evaluation.
pub const MIN_TRAINING_ROWS: usize = 10;

/// Ensemble hyperparameters, mirroring the reference classifier.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_weight_split: f32,
    pub min_weight_leaf: f32,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_weight_split: 5.0,
            min_weight_leaf: 2.0,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// The immutable fitted state swapped in by a successful training run.
struct FittedForest {
    trees: Vec<DecisionTree<f64, usize>>,
    scaler: StandardScaler,
}

impl FittedForest {
    /// Fraction of trees voting the suitable class for one scaled row.
    fn probability_suitable(&self, scaled_row: &[f64]) -> Result<f64, ModelError> {
        let row = Array2::from_shape_vec((1, NUM_FEATURES), scaled_row.to_vec())
            .map_err(|e| ModelError::scoring(format!("bad feature row shape: {e}")))?;
        let votes = self
            .trees
            .iter()
            .filter(|tree| tree.predict(&row)[0] == 1)
            .count();
        Ok(votes as f64 / self.trees.len() as f64)
    }

    /// Majority-vote labels for a matrix of scaled rows.
    fn predict_labels(&self, scaled: &Array2<f64>) -> Vec<usize> {
        let mut votes = vec![0usize; scaled.nrows()];
        for tree in &self.trees {
            for (i, label) in tree.predict(scaled).iter().enumerate() {
                votes[i] += label;
            }
        }
        let half = self.trees.len() / 2;
        votes.into_iter().map(|v| usize::from(v > half)).collect()
    }
}

/// Trainable suitability classifier.
pub struct ForestModel {
    config: ForestConfig,
    artifact_dir: PathBuf,
    fitted: RwLock<Option<FittedForest>>,
}

impl ForestModel {
    /// Construct an untrained model rooted at `artifact_dir`.
    ///
    /// Fails when the artifact directory cannot be created, which the
    /// selector treats as this tier being unavailable.
    pub fn new(artifact_dir: &Path, config: ForestConfig) -> Result<Self, ModelError> {
        std::fs::create_dir_all(artifact_dir).map_err(|e| {
            ModelError::artifact(format!(
                "cannot create artifact directory {}: {e}",
                artifact_dir.display()
            ))
        })?;
        Ok(Self {
            config,
            artifact_dir: artifact_dir.to_path_buf(),
            fitted: RwLock::new(None),
        })
    }

    pub fn is_trained(&self) -> bool {
        self.fitted.read().map(|g| g.is_some()).unwrap_or(false)
    }

    /// Fit the ensemble and report held-out accuracy.
    ///
    /// The previous fitted state keeps serving predictions until the new
    /// one is swapped in at the end.
    pub fn train(&self, data: &TrainingData) -> Result<f64, ModelError> {
        if data.len() < MIN_TRAINING_ROWS {
            return Err(ModelError::dataset(format!(
                "need at least {MIN_TRAINING_ROWS} rows, got {}",
                data.len()
            )));
        }

        let start = Instant::now();
        let (train, test) = data.stratified_split(self.config.test_fraction, self.config.seed);
        if train.is_empty() || test.is_empty() {
            return Err(ModelError::dataset("split produced an empty partition"));
        }

        let (train_x, train_y) = to_matrix(&train)?;
        let (test_x, test_y) = to_matrix(&test)?;

        // Scaler is fitted on the training split only and frozen.
        let scaler = StandardScaler::fit(&train_x)?;
        let train_scaled = scaler.transform(&train_x);
        let test_scaled = scaler.transform(&test_x);

        let mut rng = rand::rngs::StdRng::seed_from_u64(self.config.seed);
        let n_rows = train_scaled.nrows();
        let mut trees = Vec::with_capacity(self.config.n_trees);
        for _ in 0..self.config.n_trees {
            let indices: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let sample_x = train_scaled.select(Axis(0), &indices);
            let sample_y = train_y.select(Axis(0), &indices);
            let ds = linfa::Dataset::new(sample_x, sample_y);

            let tree = DecisionTree::params()
                .max_depth(Some(self.config.max_depth))
                .min_weight_split(self.config.min_weight_split)
                .min_weight_leaf(self.config.min_weight_leaf)
                .fit(&ds)
                .map_err(|e| ModelError::scoring(format!("tree fit failed: {e}")))?;
            trees.push(tree);
        }

        let fitted = FittedForest { trees, scaler };
        let predicted = fitted.predict_labels(&test_scaled);
        let correct = predicted
            .iter()
            .zip(test_y.iter())
            .filter(|(p, t)| *p == *t)
            .count();
        let accuracy = correct as f64 / test_y.len() as f64;

        {
            let mut guard = self
                .fitted
                .write()
                .map_err(|_| ModelError::scoring("fitted state lock poisoned"))?;
            *guard = Some(fitted);
        }

        info!(
            accuracy,
            trees = self.config.n_trees,
            train_rows = train.len(),
            test_rows = test.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ensemble trained"
        );
        Ok(accuracy)
    }

    /// Predict with the fitted ensemble. `NotTrained` before the first
    /// successful train or load; never a silent default.
    pub fn predict(
        &self,
        volunteer: &VolunteerRecord,
        project: &ProjectRecord,
    ) -> Result<PredictionResult, ModelError> {
        let guard = self
            .fitted
            .read()
            .map_err(|_| ModelError::scoring("fitted state lock poisoned"))?;
        let fitted = guard.as_ref().ok_or(ModelError::NotTrained)?;

        let vector = features::derive(volunteer, project);
        let scaled = fitted.scaler.transform_row(vector.as_slice());
        let probability = fitted.probability_suitable(&scaled)?;

        debug!(probability, "ensemble vote");
        Ok(PredictionResult {
            is_suitable: probability >= 0.5,
            confidence: probability.max(1.0 - probability),
            probability_suitable: probability,
        })
    }

    /// Persist the fitted triple. Errors if nothing is fitted yet.
    pub fn save(&self) -> Result<(), ModelError> {
        let guard = self
            .fitted
            .read()
            .map_err(|_| ModelError::scoring("fitted state lock poisoned"))?;
        let fitted = guard.as_ref().ok_or(ModelError::NotTrained)?;
        artifact::save_trained(&self.artifact_dir, MODEL_TYPE, &fitted.trees, &fitted.scaler)
    }

    /// Restore a persisted triple.
    ///
    /// `Ok(false)` when no artifact is present; any corrupt or mismatched
    /// artifact fails closed without touching the current state.
    pub fn load(&self) -> Result<bool, ModelError> {
        if !artifact::artifact_present(&self.artifact_dir) {
            return Ok(false);
        }

        let (trees, scaler, metadata) = artifact::load_trained::<
            Vec<DecisionTree<f64, usize>>,
            StandardScaler,
        >(&self.artifact_dir)?;

        if trees.is_empty() || !scaler.matches_contract() {
            return Err(ModelError::artifact("artifact shape violates the feature contract"));
        }

        let mut guard = self
            .fitted
            .write()
            .map_err(|_| ModelError::scoring("fitted state lock poisoned"))?;
        *guard = Some(FittedForest { trees, scaler });

        info!(
            dir = %self.artifact_dir.display(),
            model_type = %metadata.model_type,
            "model artifact loaded"
        );
        Ok(true)
    }
}

fn to_matrix(data: &TrainingData) -> Result<(Array2<f64>, Array1<usize>), ModelError> {
    let flat: Vec<f64> = data
        .features
        .iter()
        .flat_map(|f| f.as_slice().iter().copied())
        .collect();
    let records = Array2::from_shape_vec((data.len(), NUM_FEATURES), flat)
        .map_err(|e| ModelError::dataset(format!("feature matrix shape: {e}")))?;
    let targets = Array1::from_iter(data.labels.iter().map(|&l| usize::from(l)));
    Ok((records, targets))
}
