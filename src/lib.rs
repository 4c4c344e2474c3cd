//! # trainrun: sequential training-run orchestration
//!
//! Drives repeated training runs of a single model configuration. Each run
//! gets its own collision-free `run<N>` output directory, the fit
//! collaborator reports per-epoch metrics into a durable event log, and a
//! manifest records what each run produced. Run directories left by earlier
//! invocations are skipped, never reused, so running again against the same
//! output tree extends the run sequence instead of overwriting it.
//!
//! Model construction, fitting, and weight serialization live behind the
//! [`FitModel`] seam; this crate owns only sequencing, bookkeeping, and
//! persistence of run metadata.
//!
//! ```no_run
//! use trainrun::{
//!     CallbackAction, Experiment, FitOutcome, HarnessConfig, RunContext, TrainError,
//!     TrainingHarness,
//! };
//!
//! fn main() -> Result<(), TrainError> {
//!     let mut experiment = Experiment::new("dense_net", 30, 5);
//!     experiment.hyperparams = serde_json::json!({"lr": 0.001, "units": 64});
//!
//!     let harness = TrainingHarness::new(experiment, HarnessConfig::default());
//!     let mut fit = |ctx: &mut RunContext<'_>| -> Result<FitOutcome, TrainError> {
//!         for epoch in 0..ctx.experiment().epochs {
//!             // ... one framework fit step ...
//!             let loss = 1.0 / (epoch + 1) as f64;
//!             if ctx.record_epoch(loss, None)? == CallbackAction::Stop {
//!                 break;
//!             }
//!         }
//!         Ok(FitOutcome::default())
//!     };
//!     let manifests = harness.run(&mut fit)?;
//!     println!("completed {} runs", manifests.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod persistence;
pub mod training;

pub use config::{HarnessConfig, OutputConfig, RuntimeConfig, TrainingConfig};
pub use error::TrainError;
pub use training::allocator::RunAllocator;
pub use training::callbacks::{
    CallbackAction, DivergenceCallback, EarlyStoppingCallback, TrainingCallback,
};
pub use training::experiment::Experiment;
pub use training::fit::{FitModel, FitOutcome, RunContext};
pub use training::harness::TrainingHarness;
pub use training::manifest::{RunManifest, WeightsArtifact};
pub use training::metrics::{EpochRecord, TrainingMetrics};
