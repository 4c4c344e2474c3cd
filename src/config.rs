//! Configuration types for the trainrun crate.

use crate::error::TrainError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Framework runtime limits handed through to the fit collaborator.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Output directory layout.
    #[serde(default)]
    pub output: OutputConfig,
    /// Training loop behavior (installed callbacks).
    #[serde(default)]
    pub training: TrainingConfig,
}

impl HarnessConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, TrainError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Thread limits for the external training framework's session.
///
/// Defaults pin the session to one operation thread and one scheduling
/// thread. The harness only carries these values; applying them is the fit
/// collaborator's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Threads available within a single framework operation.
    #[serde(default = "default_threads")]
    pub intra_op_threads: usize,
    /// Threads available for scheduling independent operations.
    #[serde(default = "default_threads")]
    pub inter_op_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            intra_op_threads: default_threads(),
            inter_op_threads: default_threads(),
        }
    }
}

fn default_threads() -> usize {
    1
}

/// Output directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base directory for trained models and run logs.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("./saved_models")
}

/// Training loop configuration: which callbacks the harness installs for
/// each run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Stop a run early once the monitored loss stops improving.
    #[serde(default)]
    pub early_stopping: bool,
    /// Epochs without improvement before early stopping fires.
    #[serde(default = "default_patience")]
    pub early_stopping_patience: usize,
    /// Minimum loss improvement that resets the patience counter.
    #[serde(default)]
    pub min_delta: f64,
    /// Stop a run when the loss goes non-finite or spikes.
    #[serde(default = "default_true")]
    pub divergence_check: bool,
    /// Loss spike multiple (over the recent mean) treated as divergence.
    #[serde(default = "default_spike_factor")]
    pub divergence_spike_factor: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            early_stopping: false,
            early_stopping_patience: default_patience(),
            min_delta: 0.0,
            divergence_check: true,
            divergence_spike_factor: default_spike_factor(),
        }
    }
}

fn default_patience() -> usize {
    5
}

fn default_spike_factor() -> f64 {
    3.0
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.runtime.intra_op_threads, 1);
        assert_eq!(config.runtime.inter_op_threads, 1);
        assert_eq!(config.output.base_dir, PathBuf::from("./saved_models"));
        assert!(!config.training.early_stopping);
        assert_eq!(config.training.early_stopping_patience, 5);
        assert!(config.training.divergence_check);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = HarnessConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: HarnessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.runtime.intra_op_threads, 1);
        assert_eq!(parsed.training.divergence_spike_factor, 3.0);
    }

    #[test]
    fn test_load_partial_toml_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harness.toml");
        std::fs::write(
            &path,
            r#"
[runtime]
intra_op_threads = 4

[training]
early_stopping = true
"#,
        )
        .unwrap();

        let config = HarnessConfig::load(&path).unwrap();
        assert_eq!(config.runtime.intra_op_threads, 4);
        assert_eq!(config.runtime.inter_op_threads, 1);
        assert!(config.training.early_stopping);
        assert_eq!(config.training.early_stopping_patience, 5);
        assert_eq!(config.output.base_dir, PathBuf::from("./saved_models"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = HarnessConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, TrainError::Io(_)));
    }
}
