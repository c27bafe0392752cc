//! Core types for unwatermark

use serde::{Deserialize, Serialize};

use crate::progress::Progress;

/// Unique identifier for an item within a batch
///
/// Built from the submission time in milliseconds plus the item's position in
/// the submitted list, which keeps ids distinct inside one batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl ItemId {
    /// Id for the item at `index` of a batch submitted at `submitted_at_ms`
    pub fn for_position(submitted_at_ms: i64, index: usize) -> Self {
        Self(submitted_at_ms + index as i64)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Item lifecycle status
///
/// `Pending → Processing → Completed | Error`. Both `Completed` and `Error`
/// are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Admitted and waiting for the transform pass
    #[default]
    Pending,
    /// Currently inside the engine call
    Processing,
    /// Result artifact available
    Completed,
    /// Failed; no artifact
    Error,
}

impl ItemStatus {
    /// Whether no further transition can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Completed | ItemStatus::Error)
    }

    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Pending, ItemStatus::Processing)
                | (ItemStatus::Processing, ItemStatus::Completed)
                | (ItemStatus::Processing, ItemStatus::Error)
        )
    }

    /// Lowercase name used in messages and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Completed => "completed",
            ItemStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an admitted batch is driven through the pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Exactly one file: processed immediately, outcome returned to the caller
    Single,
    /// Two or more files: preload pass, then sequential transform pass
    Queue,
}

impl ProcessingMode {
    /// Pick the mode for a batch of `admitted` items
    ///
    /// Returns `None` for an empty batch, which intake treats as a no-op.
    pub fn for_batch_size(admitted: usize) -> Option<Self> {
        match admitted {
            0 => None,
            1 => Some(ProcessingMode::Single),
            _ => Some(ProcessingMode::Queue),
        }
    }
}

/// Pixel position of the watermark's top-left corner
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal offset in pixels
    pub x: u32,
    /// Vertical offset in pixels
    pub y: u32,
}

/// Watermark geometry reported by the engine for an image's dimensions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkInfo {
    /// Edge length of the (square) watermark in pixels
    pub size: u32,
    /// Where the watermark sits
    pub position: Position,
}

/// Provenance verdict for a source file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Originality {
    /// The file carries the markers of the expected generator
    pub is_from_expected_source: bool,
    /// The file has not been re-encoded or edited since generation
    pub is_unmodified: bool,
}

impl Originality {
    /// Both checks passed; hosts typically hide the warning line in this case
    pub fn is_clean(&self) -> bool {
        self.is_from_expected_source && self.is_unmodified
    }
}

/// Event emitted during the batch lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new batch replaced the queue
    BatchCreated {
        /// Batch generation
        generation: u64,
        /// Number of admitted items
        total: usize,
        /// Selected processing mode
        mode: ProcessingMode,
    },

    /// An item's source was decoded and can be displayed
    ///
    /// In queue mode every `Preloaded` precedes the first `Processing` of the
    /// batch. Sources decoded inside the transform step (single mode, or a
    /// failed preload) report it right after their own `Processing`.
    Preloaded {
        /// Item ID
        id: ItemId,
        /// Decoded width in pixels
        width: u32,
        /// Decoded height in pixels
        height: u32,
    },

    /// An item entered the engine call
    Processing {
        /// Item ID
        id: ItemId,
    },

    /// An item reached `Completed`
    Completed {
        /// Item ID
        id: ItemId,
        /// Size of the PNG artifact in bytes
        artifact_bytes: usize,
    },

    /// An item reached `Error`
    Failed {
        /// Item ID
        id: ItemId,
        /// Error message
        error: String,
    },

    /// Progress after a terminal transition (or `0/total` after batch creation)
    Progress(Progress),

    /// The transform pass visited every item
    BatchFinished {
        /// Batch generation
        generation: u64,
        /// Final progress
        progress: Progress,
    },

    /// The batch was superseded or reset while work was still in flight
    BatchAbandoned {
        /// Batch generation
        generation: u64,
    },

    /// The queue was cleared
    Reset,

    /// A download (single artifact or bundle) was produced
    Exported {
        /// File name of the download
        file_name: String,
        /// Number of artifacts it contains
        entries: usize,
    },
}
