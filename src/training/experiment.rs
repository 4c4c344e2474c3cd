//! Experiment description for repeated training runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One model configuration, trained for a number of independent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    pub id: String,
    /// Model name, used as the top-level output folder.
    pub name: String,
    /// Opaque hyperparameters forwarded to the fit collaborator. Scalars and
    /// objects of scalars fold into the title; anything else is passed
    /// through untouched.
    pub hyperparams: serde_json::Value,
    /// Training epochs per run.
    pub epochs: usize,
    /// Number of new runs to execute.
    pub runs: usize,
    /// Free-form tag folded into the output path; empty means none.
    #[serde(default)]
    pub comments: String,
    pub created_at: DateTime<Utc>,
}

impl Experiment {
    pub fn new(name: &str, epochs: usize, runs: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            hyperparams: serde_json::Value::Object(serde_json::Map::new()),
            epochs,
            runs,
            comments: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Title combining the model name and its hyperparameters, used for
    /// artifact file names and as the run root folder.
    pub fn title(&self) -> String {
        if hyperparams_empty(&self.hyperparams) {
            self.name.clone()
        } else {
            format!("{}-{}", self.name, compact_params(&self.hyperparams))
        }
    }
}

fn hyperparams_empty(params: &serde_json::Value) -> bool {
    match params {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Flatten a hyperparameter value into a short, path-safe string.
fn compact_params(params: &serde_json::Value) -> String {
    match params {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}={}", scalar(v)))
            .collect::<Vec<_>>()
            .join("_"),
        other => scalar(other),
    }
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_without_params_is_name() {
        let exp = Experiment::new("dense_net", 10, 3);
        assert_eq!(exp.title(), "dense_net");
    }

    #[test]
    fn test_title_folds_params() {
        let mut exp = Experiment::new("dense_net", 10, 3);
        exp.hyperparams = serde_json::json!({"lr": 0.001, "units": 64});
        assert_eq!(exp.title(), "dense_net-lr=0.001_units=64");
    }

    #[test]
    fn test_title_with_scalar_params() {
        let mut exp = Experiment::new("conv_net", 5, 1);
        exp.hyperparams = serde_json::json!(128);
        assert_eq!(exp.title(), "conv_net-128");
    }

    #[test]
    fn test_experiment_serde_roundtrip() {
        let exp = Experiment::new("dense_net", 10, 3);
        let json = serde_json::to_string(&exp).unwrap();
        let parsed: Experiment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, exp.name);
        assert_eq!(parsed.epochs, 10);
        assert_eq!(parsed.runs, 3);
        assert_eq!(parsed.comments, "");
    }
}
