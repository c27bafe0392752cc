//! Error types for unwatermark
//!
//! Every fallible operation in the crate returns [`Result`]. Errors raised while
//! a single item is being processed are caught by the pipeline and recorded on
//! that item (see [`crate::item::Item::error`]); they never abort the batch.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{ItemId, ItemStatus};

/// Result type alias for unwatermark operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unwatermark
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_file_size")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The source bytes could not be decoded into an image
    #[error("failed to decode {name}: {reason}")]
    Decode {
        /// Display name of the source
        name: String,
        /// Decoder message
        reason: String,
    },

    /// The engine result could not be encoded as PNG
    #[error("failed to encode result as PNG: {0}")]
    Encode(String),

    /// The watermark engine reported a failure
    #[error("engine error: {0}")]
    Engine(String),

    /// Building the bundle archive failed
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Export was requested for an item that has no result
    #[error("item {id} cannot be exported while {status}")]
    NotExportable {
        /// The item that was asked for
        id: ItemId,
        /// Its status at the time of the request
        status: ItemStatus,
    },

    /// A status change that the item state machine does not allow
    #[error("item {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The item whose status was being changed
        id: ItemId,
        /// Current status
        from: ItemStatus,
        /// Requested status
        to: ItemStatus,
    },

    /// Item not present in the current batch
    #[error("item not found: {0}")]
    NotFound(ItemId),

    /// The batch an operation belonged to was replaced or reset
    #[error("batch {generation} was superseded")]
    Superseded {
        /// Generation of the abandoned batch
        generation: u64,
    },

    /// A target file already exists and the collision action forbids replacing it
    #[error("file collision at {path:?}: {reason}")]
    FileCollision {
        /// The conflicting path
        path: PathBuf,
        /// Why the collision could not be resolved
        reason: String,
    },

    /// A blocking worker task panicked or was cancelled
    #[error("worker task failed: {0}")]
    TaskPanicked(String),

    /// Operation not supported by the configured engine
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::TaskPanicked(e.to_string())
    }
}

impl Error {
    /// Whether this error was raised by a single item's processing.
    ///
    /// The pipeline converts these into [`ItemStatus::Error`] instead of
    /// propagating them.
    pub fn is_item_failure(&self) -> bool {
        matches!(
            self,
            Error::Decode { .. }
                | Error::Encode(_)
                | Error::Engine(_)
                | Error::NotSupported(_)
                | Error::TaskPanicked(_)
        )
    }
}
