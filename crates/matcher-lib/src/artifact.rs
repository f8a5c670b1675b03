//! Persisted model artifacts
//!
//! A trained artifact is a triple: classifier blob, scaler blob and a
//! metadata record carrying the feature-name list, trained flag and per-blob
//! SHA-256 checksums. Blobs are written to a temp file and renamed, metadata
//! last, so a torn write leaves either the wholly-old or wholly-new triple
//! readable and a mismatched pair is rejected by checksum.

use crate::error::ModelError;
use crate::model::features::FEATURE_NAMES;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CLASSIFIER_FILE: &str = "volunteer_model.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const METADATA_FILE: &str = "metadata.json";

/// Metadata record persisted alongside the blobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub model_type: String,
    pub feature_names: Vec<String>,
    pub is_trained: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<i64>,
}

impl ArtifactMetadata {
    pub fn contract_names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
    }
}

/// Persist a trained classifier/scaler pair with its metadata.
pub fn save_trained<C, S>(
    dir: &Path,
    model_type: &str,
    classifier: &C,
    scaler: &S,
) -> Result<(), ModelError>
where
    C: Serialize,
    S: Serialize,
{
    fs::create_dir_all(dir)
        .map_err(|e| ModelError::artifact(format!("cannot create {}: {e}", dir.display())))?;

    let classifier_sha256 = write_json_atomic(&dir.join(CLASSIFIER_FILE), classifier)?;
    let scaler_sha256 = write_json_atomic(&dir.join(SCALER_FILE), scaler)?;

    let metadata = ArtifactMetadata {
        model_type: model_type.to_string(),
        feature_names: ArtifactMetadata::contract_names(),
        is_trained: true,
        classifier_sha256: Some(classifier_sha256),
        scaler_sha256: Some(scaler_sha256),
        trained_at: Some(chrono::Utc::now().timestamp()),
    };
    write_json_atomic(&dir.join(METADATA_FILE), &metadata)?;

    info!(dir = %dir.display(), model_type, "model artifact saved");
    Ok(())
}

/// Load a trained triple, validating checksums and the feature contract.
///
/// Fails closed: any missing file, checksum mismatch or contract drift is an
/// `ArtifactError` and nothing is partially returned.
pub fn load_trained<C, S>(dir: &Path) -> Result<(C, S, ArtifactMetadata), ModelError>
where
    C: DeserializeOwned,
    S: DeserializeOwned,
{
    let metadata: ArtifactMetadata = read_json(&dir.join(METADATA_FILE))?.0;
    if !metadata.is_trained {
        return Err(ModelError::artifact("artifact metadata is not marked trained"));
    }
    if metadata.feature_names != ArtifactMetadata::contract_names() {
        return Err(ModelError::artifact(
            "artifact feature names do not match the feature contract",
        ));
    }

    let (classifier, classifier_sha) = read_json::<C>(&dir.join(CLASSIFIER_FILE))?;
    let (scaler, scaler_sha) = read_json::<S>(&dir.join(SCALER_FILE))?;

    verify_checksum("classifier", metadata.classifier_sha256.as_deref(), &classifier_sha)?;
    verify_checksum("scaler", metadata.scaler_sha256.as_deref(), &scaler_sha)?;

    Ok((classifier, scaler, metadata))
}

/// Persist metadata only, for strategies with no weights.
pub fn save_metadata(dir: &Path, model_type: &str) -> Result<(), ModelError> {
    fs::create_dir_all(dir)
        .map_err(|e| ModelError::artifact(format!("cannot create {}: {e}", dir.display())))?;
    let metadata = ArtifactMetadata {
        model_type: model_type.to_string(),
        feature_names: ArtifactMetadata::contract_names(),
        is_trained: true,
        classifier_sha256: None,
        scaler_sha256: None,
        trained_at: None,
    };
    write_json_atomic(&dir.join(METADATA_FILE), &metadata)?;
    Ok(())
}

/// Load a metadata-only artifact.
pub fn load_metadata(dir: &Path) -> Result<ArtifactMetadata, ModelError> {
    Ok(read_json(&dir.join(METADATA_FILE))?.0)
}

/// True when a trained triple appears to be present.
pub fn artifact_present(dir: &Path) -> bool {
    dir.join(METADATA_FILE).exists() && dir.join(CLASSIFIER_FILE).exists()
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<String, ModelError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| ModelError::artifact(format!("serialize {}: {e}", path.display())))?;
    let checksum = compute_checksum(&bytes);

    let temp_path = temp_path_for(path);
    let mut file = File::create(&temp_path)
        .map_err(|e| ModelError::artifact(format!("create {}: {e}", temp_path.display())))?;
    file.write_all(&bytes)
        .and_then(|()| file.sync_all())
        .map_err(|e| ModelError::artifact(format!("write {}: {e}", temp_path.display())))?;
    fs::rename(&temp_path, path)
        .map_err(|e| ModelError::artifact(format!("rename into {}: {e}", path.display())))?;

    Ok(checksum)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<(T, String), ModelError> {
    let bytes = fs::read(path)
        .map_err(|e| ModelError::artifact(format!("read {}: {e}", path.display())))?;
    let checksum = compute_checksum(&bytes);
    let value = serde_json::from_slice(&bytes)
        .map_err(|e| ModelError::artifact(format!("corrupt {}: {e}", path.display())))?;
    Ok((value, checksum))
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("tmp")
}

fn verify_checksum(blob: &str, recorded: Option<&str>, actual: &str) -> Result<(), ModelError> {
    match recorded {
        Some(expected) if expected != actual => Err(ModelError::artifact(format!(
            "{blob} checksum mismatch: expected {expected}, got {actual}"
        ))),
        _ => Ok(()),
    }
}

/// SHA-256 of a serialized blob.
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
