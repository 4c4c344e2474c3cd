//! Sequential run-directory allocation.
//!
//! Repeated trainings of one configuration each land in their own output
//! directory, `run1`, `run2`, ... under a common base. Directories left by
//! earlier invocations are skipped, never reused, so running again against
//! the same base extends the sequence instead of overwriting it.

use crate::error::TrainError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Allocates collision-free sequential run directories under a base path and
/// drives one training invocation per fresh directory.
#[derive(Debug)]
pub struct RunAllocator {
    base_path: PathBuf,
    requested_count: usize,
    completed_count: usize,
    candidate_id: usize,
}

impl RunAllocator {
    /// Create an allocator for `requested_count` new runs under `base_path`.
    pub fn new(base_path: impl Into<PathBuf>, requested_count: usize) -> Self {
        Self {
            base_path: base_path.into(),
            requested_count,
            completed_count: 0,
            candidate_id: 1,
        }
    }

    /// Runs completed by this allocator so far.
    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    /// Base directory runs are allocated under.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Directory a given run id maps to.
    pub fn run_dir(&self, run_id: usize) -> PathBuf {
        self.base_path.join(format!("run{run_id}"))
    }

    /// Invoke `train_fn` once per fresh run directory until the requested
    /// number of new runs have completed.
    ///
    /// The base directory is created (with parents) if absent. Candidate ids
    /// start at 1 and advance by one every iteration; an id whose directory
    /// already exists on disk is skipped and never revisited, regardless of
    /// what the directory contains. A `train_fn` error aborts the sequence
    /// immediately and propagates unchanged; directories produced by
    /// completed iterations stay in place.
    pub fn allocate_and_run<F>(&mut self, mut train_fn: F) -> Result<(), TrainError>
    where
        F: FnMut(&Path) -> Result<(), TrainError>,
    {
        std::fs::create_dir_all(&self.base_path)?;

        while self.completed_count < self.requested_count {
            let run_dir = self.run_dir(self.candidate_id);
            if run_dir.is_dir() {
                debug!(run_dir = %run_dir.display(), "Run directory exists, skipping id");
            } else {
                train_fn(&run_dir)?;
                self.completed_count += 1;
            }
            self.candidate_id += 1;
        }

        Ok(())
    }
}
