//! Training dataset loading and splitting
//!
//! Datasets are CSV files with one row per historical volunteer/project
//! pairing: the eleven raw attribute columns plus the binary `is_suitable`
//! label. Rows are re-derived through the feature pipeline so training and
//! inference share the exact same vector construction.

use crate::error::ModelError;
use crate::model::features::{self, FeatureVector};
use crate::models::{ProjectRecord, VolunteerRecord};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use std::path::Path;

/// One labeled CSV row. Attribute columns absent from the file default to
/// zero, matching the prediction path; the label column must be present.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct DatasetRow {
    reliability: f64,
    punctuality: f64,
    task_quality: f64,
    success_rate: f64,
    total_projects: u32,
    completed_projects: u32,
    total_hours: f64,
    availability_hours: f64,
    project_duration: f64,
    project_complexity: f64,
    required_hours: f64,
    is_suitable: u8,
}

impl Default for DatasetRow {
    fn default() -> Self {
        Self {
            reliability: 0.0,
            punctuality: 0.0,
            task_quality: 0.0,
            success_rate: 0.0,
            total_projects: 0,
            completed_projects: 0,
            total_hours: 0.0,
            availability_hours: 0.0,
            project_duration: 0.0,
            project_complexity: 0.0,
            required_hours: 0.0,
            is_suitable: 0,
        }
    }
}

impl DatasetRow {
    fn records(&self) -> (VolunteerRecord, ProjectRecord) {
        (
            VolunteerRecord {
                reliability: self.reliability,
                punctuality: self.punctuality,
                task_quality: self.task_quality,
                success_rate: self.success_rate,
                total_projects: self.total_projects,
                completed_projects: self.completed_projects,
                total_hours: self.total_hours,
                availability_hours: self.availability_hours,
            },
            ProjectRecord {
                project_duration: self.project_duration,
                project_complexity: self.project_complexity,
                required_hours: self.required_hours,
            },
        )
    }
}

/// A loaded, derived dataset.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<bool>,
}

impl TrainingData {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Stratified split preserving class balance.
    ///
    /// Shuffles each class with the seeded RNG, then takes `test_fraction`
    /// of each for the held-out half.
    pub fn stratified_split(&self, test_fraction: f64, seed: u64) -> (TrainingData, TrainingData) {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

        let mut positives: Vec<usize> = (0..self.len()).filter(|&i| self.labels[i]).collect();
        let mut negatives: Vec<usize> = (0..self.len()).filter(|&i| !self.labels[i]).collect();
        positives.shuffle(&mut rng);
        negatives.shuffle(&mut rng);

        let mut train = TrainingData { features: Vec::new(), labels: Vec::new() };
        let mut test = TrainingData { features: Vec::new(), labels: Vec::new() };

        for class in [positives, negatives] {
            let n_test = ((class.len() as f64) * test_fraction).round() as usize;
            for (pos, idx) in class.into_iter().enumerate() {
                let target = if pos < n_test { &mut test } else { &mut train };
                target.features.push(self.features[idx].clone());
                target.labels.push(self.labels[idx]);
            }
        }

        (train, test)
    }
}

/// Load and validate a CSV dataset.
///
/// Fails with `ModelError::Dataset` when the file is missing, the
/// `is_suitable` label column is absent, any row is malformed, or the file
/// holds no rows.
pub fn load_csv(path: &Path) -> Result<TrainingData, ModelError> {
    if !path.exists() {
        return Err(ModelError::dataset(format!(
            "training data not found: {}",
            path.display()
        )));
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ModelError::dataset(format!("failed to open {}: {e}", path.display())))?;

    let has_label = reader
        .headers()
        .map_err(|e| ModelError::dataset(format!("unreadable header: {e}")))?
        .iter()
        .any(|h| h == "is_suitable");
    if !has_label {
        return Err(ModelError::dataset("missing is_suitable label column"));
    }

    let mut features = Vec::new();
    let mut labels = Vec::new();
    for (i, row) in reader.deserialize::<DatasetRow>().enumerate() {
        let row = row.map_err(|e| ModelError::dataset(format!("malformed row {}: {e}", i + 1)))?;
        let (volunteer, project) = row.records();
        features.push(features::derive(&volunteer, &project));
        labels.push(row.is_suitable != 0);
    }

    if labels.is_empty() {
        return Err(ModelError::dataset("dataset holds no rows"));
    }

    Ok(TrainingData { features, labels })
}
