//! Watermark-removal engine seam
//!
//! The removal algorithm itself lives outside this crate. The pipeline talks to
//! it through the [`WatermarkEngine`] trait, which hosts implement around their
//! model or service. [`NoOpEngine`] is provided for graceful degradation and for
//! wiring a host before a real engine is available.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use unwatermark::{Config, NoOpEngine, Unwatermarker, WatermarkEngine};
//!
//! let engine: Arc<dyn WatermarkEngine> = Arc::new(NoOpEngine);
//! let pipeline = Unwatermarker::new(Config::default(), engine);
//! ```

mod noop;
mod traits;

pub use noop::NoOpEngine;
pub use traits::WatermarkEngine;
