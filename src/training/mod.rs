//! Training infrastructure: run allocation, the harness loop, metrics,
//! callbacks, and run manifests.

pub mod allocator;
pub mod callbacks;
pub mod experiment;
pub mod fit;
pub mod harness;
pub mod manifest;
pub mod metrics;

pub use allocator::RunAllocator;
pub use callbacks::{CallbackAction, DivergenceCallback, EarlyStoppingCallback, TrainingCallback};
pub use experiment::Experiment;
pub use fit::{FitModel, FitOutcome, RunContext};
pub use harness::TrainingHarness;
pub use manifest::{RunManifest, WeightsArtifact};
pub use metrics::{EpochRecord, TrainingMetrics};
