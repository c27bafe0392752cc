//! Helpers for creating test pipelines

use std::sync::Arc;
use tempfile::TempDir;
use unwatermark::{Config, Unwatermarker};

use super::fixtures::MockEngine;

/// Pipeline backed by `engine`, exporting into a fresh temp directory
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn create_test_unwatermarker(engine: MockEngine) -> (Unwatermarker, Arc<MockEngine>, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.export.output_dir = temp_dir.path().join("output");

    let engine = Arc::new(engine);
    let unwatermarker = Unwatermarker::new(config, engine.clone());
    (unwatermarker, engine, temp_dir)
}
