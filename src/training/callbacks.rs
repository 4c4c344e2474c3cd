//! Training callbacks: early stopping and divergence detection.

use crate::training::metrics::TrainingMetrics;

/// Verdict a callback returns at the end of an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    Continue,
    Stop,
}

/// End-of-epoch hook, run after every epoch recorded through the run
/// context. Any `Stop` verdict ends the run.
pub trait TrainingCallback: Send {
    fn on_epoch_end(&mut self, epoch: usize, metrics: &TrainingMetrics) -> CallbackAction;
}

/// Stops a run once the monitored loss has not improved for `patience`
/// consecutive epochs.
#[derive(Debug, Clone)]
pub struct EarlyStoppingCallback {
    pub patience: usize,
    pub min_delta: f64,
    counter: usize,
    best_loss: Option<f64>,
}

impl EarlyStoppingCallback {
    pub fn new(patience: usize, min_delta: f64) -> Self {
        Self {
            patience,
            min_delta,
            counter: 0,
            best_loss: None,
        }
    }
}

impl TrainingCallback for EarlyStoppingCallback {
    fn on_epoch_end(&mut self, _epoch: usize, metrics: &TrainingMetrics) -> CallbackAction {
        let Some(loss) = metrics.monitored_loss() else {
            return CallbackAction::Continue;
        };
        match self.best_loss {
            None => {
                self.best_loss = Some(loss);
                CallbackAction::Continue
            }
            Some(best) if loss < best - self.min_delta => {
                self.best_loss = Some(loss);
                self.counter = 0;
                CallbackAction::Continue
            }
            Some(_) => {
                self.counter += 1;
                if self.counter >= self.patience {
                    CallbackAction::Stop
                } else {
                    CallbackAction::Continue
                }
            }
        }
    }
}

/// Stops a run when the training loss goes non-finite or spikes far above
/// the mean of the recent window.
#[derive(Debug, Clone)]
pub struct DivergenceCallback {
    pub spike_factor: f64,
    window: Vec<f64>,
    window_size: usize,
}

impl DivergenceCallback {
    pub fn new(spike_factor: f64, window_size: usize) -> Self {
        Self {
            spike_factor,
            window: Vec::new(),
            window_size,
        }
    }
}

impl TrainingCallback for DivergenceCallback {
    fn on_epoch_end(&mut self, _epoch: usize, metrics: &TrainingMetrics) -> CallbackAction {
        let Some(loss) = metrics.last_loss() else {
            return CallbackAction::Continue;
        };
        if !loss.is_finite() {
            return CallbackAction::Stop;
        }

        self.window.push(loss);
        if self.window.len() > self.window_size {
            self.window.remove(0);
        }

        // A spike only means anything once the window has some history.
        if self.window.len() >= 3 {
            let mean = self.window.iter().sum::<f64>() / self.window.len() as f64;
            if loss > mean * self.spike_factor {
                return CallbackAction::Stop;
            }
        }

        CallbackAction::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metrics_with(losses: &[f64]) -> TrainingMetrics {
        let mut metrics = TrainingMetrics::default();
        for &loss in losses {
            metrics.record_epoch(loss, None);
        }
        metrics
    }

    #[test]
    fn test_early_stopping_fires_after_patience() {
        let mut cb = EarlyStoppingCallback::new(3, 0.01);
        let mut metrics = TrainingMetrics::default();

        for (loss, expected) in [
            (0.5, CallbackAction::Continue), // first: sets best
            (0.4, CallbackAction::Continue), // improves
            (0.4, CallbackAction::Continue), // counter=1
            (0.4, CallbackAction::Continue), // counter=2
            (0.4, CallbackAction::Stop),     // counter=3 >= patience
        ] {
            metrics.record_epoch(loss, None);
            assert_eq!(cb.on_epoch_end(metrics.epochs_completed, &metrics), expected);
        }
    }

    #[test]
    fn test_early_stopping_min_delta_ignores_tiny_improvement() {
        let mut cb = EarlyStoppingCallback::new(1, 0.1);
        let mut metrics = TrainingMetrics::default();

        metrics.record_epoch(0.5, None);
        assert_eq!(cb.on_epoch_end(1, &metrics), CallbackAction::Continue);
        // 0.45 is an improvement, but smaller than min_delta.
        metrics.record_epoch(0.45, None);
        assert_eq!(cb.on_epoch_end(2, &metrics), CallbackAction::Stop);
    }

    #[test]
    fn test_divergence_stops_on_nan() {
        let mut cb = DivergenceCallback::new(3.0, 5);
        let metrics = metrics_with(&[f64::NAN]);
        assert_eq!(cb.on_epoch_end(1, &metrics), CallbackAction::Stop);
    }

    #[test]
    fn test_divergence_stops_on_spike() {
        let mut cb = DivergenceCallback::new(3.0, 5);
        let mut metrics = TrainingMetrics::default();

        for loss in [1.0, 1.1, 0.9] {
            metrics.record_epoch(loss, None);
            assert_eq!(
                cb.on_epoch_end(metrics.epochs_completed, &metrics),
                CallbackAction::Continue
            );
        }
        metrics.record_epoch(50.0, None);
        assert_eq!(cb.on_epoch_end(4, &metrics), CallbackAction::Stop);
    }
}
