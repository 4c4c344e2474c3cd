//! Drives the run allocator over an experiment with a fit collaborator.

use crate::config::HarnessConfig;
use crate::error::TrainError;
use crate::training::allocator::RunAllocator;
use crate::training::callbacks::{DivergenceCallback, EarlyStoppingCallback, TrainingCallback};
use crate::training::experiment::Experiment;
use crate::training::fit::{FitModel, RunContext};
use crate::training::manifest::RunManifest;
use std::path::PathBuf;
use tracing::info;

/// Window of recent epochs the divergence callback averages over.
const DIVERGENCE_WINDOW: usize = 10;

/// Orchestrates the requested number of training runs for one experiment.
pub struct TrainingHarness {
    experiment: Experiment,
    config: HarnessConfig,
}

impl TrainingHarness {
    pub fn new(experiment: Experiment, config: HarnessConfig) -> Self {
        Self { experiment, config }
    }

    pub fn experiment(&self) -> &Experiment {
        &self.experiment
    }

    /// Directory holding everything produced for this experiment's model:
    /// `<base_dir>/<name>/`, with a `<comments>/` leaf when comments are set.
    pub fn model_dir(&self) -> PathBuf {
        let mut dir = self.config.output.base_dir.join(&self.experiment.name);
        if !self.experiment.comments.is_empty() {
            dir.push(&self.experiment.comments);
        }
        dir
    }

    /// Base directory run directories are allocated under.
    pub fn run_base(&self) -> PathBuf {
        self.model_dir().join("runs").join(self.experiment.title())
    }

    /// Execute the experiment's runs, returning one manifest per new run.
    ///
    /// Run directories left by earlier invocations are skipped, so running
    /// the same experiment again appends new runs instead of overwriting old
    /// ones. A collaborator failure aborts the remaining runs and
    /// propagates; manifests of already-completed runs stay on disk.
    pub fn run<M: FitModel>(&self, model: &mut M) -> Result<Vec<RunManifest>, TrainError> {
        info!(
            title = %self.experiment.title(),
            runs = self.experiment.runs,
            "Starting training runs"
        );

        let mut allocator = RunAllocator::new(self.run_base(), self.experiment.runs);
        let mut manifests = Vec::new();

        allocator.allocate_and_run(|run_dir| {
            let run_number = manifests.len() + 1;
            info!(run_number, run_dir = %run_dir.display(), "Starting run");
            std::fs::create_dir_all(run_dir)?;

            let mut ctx = RunContext::new(
                &self.experiment,
                &self.config.runtime,
                run_dir.to_path_buf(),
                self.build_callbacks(),
            );
            let outcome = model.fit(&mut ctx)?;
            let metrics = ctx.into_metrics();

            let manifest = RunManifest::for_run(
                &self.experiment,
                run_dir,
                metrics,
                outcome.weights_path.as_deref(),
            )?;
            manifest.save()?;
            manifests.push(manifest);
            Ok(())
        })?;

        Ok(manifests)
    }

    /// Callbacks are rebuilt per run so their state never leaks across runs.
    fn build_callbacks(&self) -> Vec<Box<dyn TrainingCallback>> {
        let training = &self.config.training;
        let mut callbacks: Vec<Box<dyn TrainingCallback>> = Vec::new();
        if training.early_stopping {
            callbacks.push(Box::new(EarlyStoppingCallback::new(
                training.early_stopping_patience,
                training.min_delta,
            )));
        }
        if training.divergence_check {
            callbacks.push(Box::new(DivergenceCallback::new(
                training.divergence_spike_factor,
                DIVERGENCE_WINDOW,
            )));
        }
        callbacks
    }
}
