//! Training metrics tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded epoch, as appended to the run's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub loss: f64,
    pub val_loss: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Accumulated metrics for a single training run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub epochs_completed: usize,
    pub loss_history: Vec<f64>,
    pub val_loss_history: Vec<f64>,
    pub best_epoch: Option<usize>,
    pub best_loss: Option<f64>,
    pub total_training_time_secs: f64,
}

impl TrainingMetrics {
    /// Record one epoch. Best-epoch tracking follows validation loss when
    /// present, training loss otherwise.
    pub fn record_epoch(&mut self, loss: f64, val_loss: Option<f64>) {
        self.loss_history.push(loss);
        if let Some(vl) = val_loss {
            self.val_loss_history.push(vl);
        }
        self.epochs_completed += 1;

        let check_loss = val_loss.unwrap_or(loss);
        if self.best_loss.is_none_or(|best| check_loss < best) {
            self.best_loss = Some(check_loss);
            self.best_epoch = Some(self.epochs_completed);
        }
    }

    /// Training loss of the most recent epoch.
    pub fn last_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }

    /// Loss the callbacks monitor: latest validation loss when one exists,
    /// latest training loss otherwise.
    pub fn monitored_loss(&self) -> Option<f64> {
        self.val_loss_history
            .last()
            .or_else(|| self.loss_history.last())
            .copied()
    }
}
