//! Per-run manifest: what was trained and which artifacts were produced.

use crate::error::TrainError;
use crate::persistence;
use crate::training::experiment::Experiment;
use crate::training::metrics::TrainingMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the manifest inside each run directory.
pub const MANIFEST_FILE: &str = "run.json";

/// A weights file written by the fit collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsArtifact {
    pub path: PathBuf,
    /// SHA-256 of the file contents.
    pub sha256: String,
    pub size_bytes: u64,
}

impl WeightsArtifact {
    /// Hash and measure a weights file on disk.
    pub fn from_file(path: &Path) -> Result<Self, TrainError> {
        let data = std::fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&data);
        Ok(Self {
            path: path.to_path_buf(),
            sha256: format!("{:x}", hasher.finalize()),
            size_bytes: data.len() as u64,
        })
    }
}

/// Record of one completed training run, written as `run.json` inside the
/// run directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub id: String,
    pub experiment: Experiment,
    pub run_dir: PathBuf,
    pub metrics: TrainingMetrics,
    pub weights: Option<WeightsArtifact>,
    pub created_at: DateTime<Utc>,
}

impl RunManifest {
    /// Build a manifest for a finished run, hashing the weights file if one
    /// was reported.
    pub fn for_run(
        experiment: &Experiment,
        run_dir: &Path,
        metrics: TrainingMetrics,
        weights_path: Option<&Path>,
    ) -> Result<Self, TrainError> {
        let weights = weights_path.map(WeightsArtifact::from_file).transpose()?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            experiment: experiment.clone(),
            run_dir: run_dir.to_path_buf(),
            metrics,
            weights,
            created_at: Utc::now(),
        })
    }

    /// Write the manifest into its run directory.
    pub fn save(&self) -> Result<(), TrainError> {
        let path = self.run_dir.join(MANIFEST_FILE);
        persistence::atomic_write_json(&path, self)?;
        debug!(path = %path.display(), "Wrote run manifest");
        Ok(())
    }

    /// Load the manifest for a run directory, if one has been written.
    pub fn load(run_dir: &Path) -> Result<Option<Self>, TrainError> {
        Ok(persistence::load_json(&run_dir.join(MANIFEST_FILE))?)
    }
}
