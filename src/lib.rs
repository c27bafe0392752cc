//! # unwatermark
//!
//! Batch pipeline for removing visible watermarks from images.
//!
//! ## Design Philosophy
//!
//! unwatermark is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Engine-agnostic** - The removal algorithm is plugged in through [`WatermarkEngine`]
//! - **Failure-isolating** - One bad image never stops the rest of its batch
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! A submission is validated (media type and size), becomes the current batch
//! and is processed either immediately (one file) or as a sequential queue
//! (several files). Finished PNG artifacts can be downloaded one at a time or
//! bundled into a zip archive.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use unwatermark::{Config, NoOpEngine, SourceFile, Submission, Unwatermarker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let unwatermarker = Unwatermarker::new(Config::default(), Arc::new(NoOpEngine));
//!
//!     // Subscribe to events
//!     let mut events = unwatermarker.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let files = vec![
//!         SourceFile::from_path("a.png".as_ref()).await?,
//!         SourceFile::from_path("b.jpg".as_ref()).await?,
//!     ];
//!     if let Some(Submission::Queued(batch)) = unwatermarker.submit(files).await? {
//!         let progress = batch.wait().await?;
//!         println!("processed {progress}");
//!     }
//!
//!     if let Some(path) = unwatermarker.save_bundle().await? {
//!         println!("bundle written to {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Watermark engine seam
pub mod engine;
/// Error types
pub mod error;
/// Single-artifact and zip bundle export
pub mod export;
/// Intake validation
pub mod intake;
/// Items and their lifecycle
pub mod item;
/// Pipeline controller (decomposed into focused submodules)
pub mod pipeline;
/// Batch progress counter
pub mod progress;
/// Submitted source files
pub mod source;
/// The queue store
pub mod store;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ArchiveCompression, Config, ExportConfig, FileCollisionAction, IntakeConfig};
pub use engine::{NoOpEngine, WatermarkEngine};
pub use error::{Error, Result};
pub use export::Download;
pub use item::ItemSnapshot;
pub use pipeline::{QueuedBatch, Submission, Unwatermarker};
pub use progress::Progress;
pub use source::SourceFile;
pub use store::QueueStore;
pub use types::{Event, ItemId, ItemStatus, Originality, Position, ProcessingMode, WatermarkInfo};
