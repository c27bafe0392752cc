//! Shared test helpers: a scripted engine and PNG fixtures.

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::Unwatermarker;
use crate::config::Config;
use crate::engine::WatermarkEngine;
use crate::error::{Error, Result};
use crate::source::SourceFile;
use crate::types::{Originality, Position, WatermarkInfo};

/// Engine whose `remove_watermark` calls succeed or fail on a script
///
/// Call numbers are 1-based, counted across the engine's lifetime.
#[derive(Default)]
pub(crate) struct ScriptedEngine {
    fail_calls: HashSet<usize>,
    hang_calls: HashSet<usize>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail the given call numbers
    pub(crate) fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_calls.extend(calls);
        self
    }

    /// Never return from the given call numbers
    pub(crate) fn hanging_on(mut self, calls: &[usize]) -> Self {
        self.hang_calls.extend(calls);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WatermarkEngine for ScriptedEngine {
    fn describe_watermark(&self, width: u32, height: u32) -> WatermarkInfo {
        let size = if width > 1024 && height > 1024 { 96 } else { 48 };
        WatermarkInfo {
            size,
            position: Position {
                x: width.saturating_sub(size),
                y: height.saturating_sub(size),
            },
        }
    }

    async fn remove_watermark(&self, image: DynamicImage) -> Result<DynamicImage> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if self.hang_calls.contains(&call) {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_calls.contains(&call) {
            return Err(Error::Engine(format!("scripted failure on call {call}")));
        }
        Ok(image)
    }

    async fn check_originality(&self, _source: &SourceFile) -> Result<Originality> {
        Ok(Originality {
            is_from_expected_source: true,
            is_unmodified: true,
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Encode a solid-color PNG of the given size
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub(crate) fn png_source(name: &str) -> SourceFile {
    SourceFile::new(name, "image/png", png_bytes(4, 4))
}

/// Declared as PNG but not decodable
pub(crate) fn corrupt_source(name: &str) -> SourceFile {
    SourceFile::new(name, "image/png", b"definitely not a png".to_vec())
}

pub(crate) fn create_test_unwatermarker(engine: ScriptedEngine) -> (Unwatermarker, Arc<ScriptedEngine>) {
    let engine = Arc::new(engine);
    let unwatermarker = Unwatermarker::new(Config::default(), engine.clone());
    (unwatermarker, engine)
}
