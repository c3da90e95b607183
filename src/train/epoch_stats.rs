use serde::{Serialize, Deserialize};

/// Per-epoch training statistics returned by `train`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mini-batches processed this epoch.
    pub batches: usize,
    /// Training samples that contributed a gradient; the remainder that does
    /// not fill a whole batch is left out.
    pub samples_used: usize,
    /// Mean cost over `samples_used`, measured during the updates.
    pub mean_cost: f64,
    /// Test samples whose arg-max prediction equals their label.
    pub correct: usize,
    /// Size of the test set.
    pub total: usize,
    /// Wall-clock duration of this epoch in milliseconds, evaluation included.
    pub elapsed_ms: u64,
}

impl EpochStats {
    /// `correct / total`, or 0 when the test set is empty.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}
