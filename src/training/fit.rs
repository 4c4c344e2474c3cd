//! The fit collaborator seam and per-run context.

use crate::config::RuntimeConfig;
use crate::error::TrainError;
use crate::persistence;
use crate::training::callbacks::{CallbackAction, TrainingCallback};
use crate::training::experiment::Experiment;
use crate::training::metrics::{EpochRecord, TrainingMetrics};
use std::path::{Path, PathBuf};
use tracing::info;

/// File inside each run directory holding one JSON line per recorded epoch.
pub const EPOCH_LOG_FILE: &str = "epochs.jsonl";

/// External training collaborator. Owns model construction, fitting, and
/// weight serialization; the harness only sequences runs around it.
///
/// Implemented for free by any
/// `FnMut(&mut RunContext<'_>) -> Result<FitOutcome, TrainError>` closure.
pub trait FitModel {
    /// Train one run into `ctx.run_dir()`.
    ///
    /// Implementations report progress through [`RunContext::record_epoch`]
    /// and should end the fit when it returns [`CallbackAction::Stop`].
    fn fit(&mut self, ctx: &mut RunContext<'_>) -> Result<FitOutcome, TrainError>;
}

impl<F> FitModel for F
where
    F: FnMut(&mut RunContext<'_>) -> Result<FitOutcome, TrainError>,
{
    fn fit(&mut self, ctx: &mut RunContext<'_>) -> Result<FitOutcome, TrainError> {
        self(ctx)
    }
}

/// What a completed fit reports back to the harness.
#[derive(Debug, Clone, Default)]
pub struct FitOutcome {
    /// Weights file the collaborator wrote, if any. Recorded with a digest
    /// in the run manifest.
    pub weights_path: Option<PathBuf>,
}

/// Per-run state handed to the fit collaborator.
pub struct RunContext<'a> {
    experiment: &'a Experiment,
    runtime: &'a RuntimeConfig,
    run_dir: PathBuf,
    callbacks: Vec<Box<dyn TrainingCallback>>,
    metrics: TrainingMetrics,
    events_path: PathBuf,
}

impl<'a> RunContext<'a> {
    pub(crate) fn new(
        experiment: &'a Experiment,
        runtime: &'a RuntimeConfig,
        run_dir: PathBuf,
        callbacks: Vec<Box<dyn TrainingCallback>>,
    ) -> Self {
        let events_path = run_dir.join(EPOCH_LOG_FILE);
        Self {
            experiment,
            runtime,
            run_dir,
            callbacks,
            metrics: TrainingMetrics::default(),
            events_path,
        }
    }

    /// Directory this run writes into.
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Experiment being trained.
    pub fn experiment(&self) -> &Experiment {
        self.experiment
    }

    /// Thread limits the collaborator should apply to its framework session.
    pub fn runtime(&self) -> &RuntimeConfig {
        self.runtime
    }

    /// Metrics recorded so far in this run.
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Record one completed epoch.
    ///
    /// Appends the epoch to the run's event log, updates metrics, and runs
    /// the installed callbacks. Returns [`CallbackAction::Stop`] when any
    /// callback requests termination; the collaborator is expected to end
    /// the fit and return normally.
    pub fn record_epoch(
        &mut self,
        loss: f64,
        val_loss: Option<f64>,
    ) -> Result<CallbackAction, TrainError> {
        self.metrics.record_epoch(loss, val_loss);
        let record = EpochRecord {
            epoch: self.metrics.epochs_completed,
            loss,
            val_loss,
            recorded_at: chrono::Utc::now(),
        };
        persistence::append_jsonl(&self.events_path, &record)?;

        for callback in self.callbacks.iter_mut() {
            if callback.on_epoch_end(record.epoch, &self.metrics) == CallbackAction::Stop {
                info!(epoch = record.epoch, "Callback requested stop");
                return Ok(CallbackAction::Stop);
            }
        }
        Ok(CallbackAction::Continue)
    }

    pub(crate) fn into_metrics(self) -> TrainingMetrics {
        self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::callbacks::EarlyStoppingCallback;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn context<'a>(
        experiment: &'a Experiment,
        runtime: &'a RuntimeConfig,
        run_dir: &Path,
        callbacks: Vec<Box<dyn TrainingCallback>>,
    ) -> RunContext<'a> {
        std::fs::create_dir_all(run_dir).unwrap();
        RunContext::new(experiment, runtime, run_dir.to_path_buf(), callbacks)
    }

    #[test]
    fn test_record_epoch_appends_event_log() {
        let dir = TempDir::new().unwrap();
        let experiment = Experiment::new("dense_net", 3, 1);
        let runtime = RuntimeConfig::default();
        let run_dir = dir.path().join("run1");
        let mut ctx = context(&experiment, &runtime, &run_dir, Vec::new());

        for epoch in 0..3 {
            let action = ctx.record_epoch(1.0 / (epoch + 1) as f64, None).unwrap();
            assert_eq!(action, CallbackAction::Continue);
        }

        let content = std::fs::read_to_string(run_dir.join(EPOCH_LOG_FILE)).unwrap();
        let records: Vec<EpochRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].epoch, 3);
        assert_eq!(ctx.metrics().epochs_completed, 3);
    }

    #[test]
    fn test_callback_stop_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let experiment = Experiment::new("dense_net", 10, 1);
        let runtime = RuntimeConfig::default();
        let run_dir = dir.path().join("run1");
        let callbacks: Vec<Box<dyn TrainingCallback>> =
            vec![Box::new(EarlyStoppingCallback::new(1, 0.0))];
        let mut ctx = context(&experiment, &runtime, &run_dir, callbacks);

        assert_eq!(ctx.record_epoch(0.5, None).unwrap(), CallbackAction::Continue);
        // No improvement; patience of one fires immediately.
        assert_eq!(ctx.record_epoch(0.5, None).unwrap(), CallbackAction::Stop);
    }
}
