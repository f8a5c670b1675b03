//! Feature standardization
//!
//! Zero-mean unit-variance scaling fitted on the training split only. The
//! fitted parameters are frozen and applied as-is at inference time; they
//! travel with the classifier in the persisted artifact.

use crate::error::ModelError;
use crate::model::features::NUM_FEATURES;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted standard scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    /// Fit on the rows of `records`.
    ///
    /// A constant column gets a protective standard deviation of 1 so the
    /// transform stays finite.
    pub fn fit(records: &Array2<f64>) -> Result<Self, ModelError> {
        let n = records.nrows();
        if n == 0 {
            return Err(ModelError::dataset("cannot fit scaler on zero rows"));
        }

        let means = records.mean_axis(Axis(0)).map(|m| m.to_vec()).ok_or_else(|| {
            ModelError::scoring("mean computation failed")
        })?;

        let mut stds = vec![0.0f64; records.ncols()];
        for (j, std) in stds.iter_mut().enumerate() {
            let col = records.column(j);
            let mean = means[j];
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
            let s = var.sqrt();
            *std = if s > f64::EPSILON { s } else { 1.0 };
        }

        Ok(Self { means, stds })
    }

    /// Apply the fitted transform to a matrix of rows.
    pub fn transform(&self, records: &Array2<f64>) -> Array2<f64> {
        let mut out = records.clone();
        for mut row in out.rows_mut() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (*v - self.means[j]) / self.stds[j];
            }
        }
        out
    }

    /// Apply the fitted transform to a single feature row.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    /// Sanity check against the feature contract.
    pub fn matches_contract(&self) -> bool {
        self.means.len() == NUM_FEATURES && self.stds.len() == NUM_FEATURES
    }
}
