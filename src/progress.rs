//! Batch progress aggregation

use serde::{Deserialize, Serialize};

/// "N of M complete" for the current batch
///
/// `processed` counts items that reached a terminal state, successful or not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Items in `Completed` or `Error`
    pub processed: usize,
    /// Items in the batch
    pub total: usize,
}

impl Progress {
    /// Build a progress pair
    pub fn new(processed: usize, total: usize) -> Self {
        Self { processed, total }
    }

    /// Every item reached a terminal state (an empty batch is never finished)
    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.processed >= self.total
    }

    /// Percentage for progress bars (0.0 to 100.0)
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        (self.processed.min(self.total) as f32 / self.total as f32) * 100.0
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.processed, self.total)
    }
}
