//! Image fixtures and a scripted watermark engine

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use unwatermark::{Error, Originality, Position, SourceFile, WatermarkEngine, WatermarkInfo};

/// Engine that replays a script of successes, failures and stalls
///
/// Call numbers are 1-based and counted across all batches.
#[derive(Default)]
pub struct MockEngine {
    fail_calls: HashSet<usize>,
    hang_calls: HashSet<usize>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    seen: Mutex<Vec<(u32, u32)>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given `remove_watermark` call numbers
    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.fail_calls.extend(calls);
        self
    }

    /// Stall the given call numbers until the batch is abandoned
    pub fn hanging_on(mut self, calls: &[usize]) -> Self {
        self.hang_calls.extend(calls);
        self
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Dimensions of every image handed to the engine, in call order
    pub fn seen(&self) -> Vec<(u32, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl WatermarkEngine for MockEngine {
    fn describe_watermark(&self, width: u32, height: u32) -> WatermarkInfo {
        WatermarkInfo {
            size: 48,
            position: Position {
                x: width.saturating_sub(80),
                y: height.saturating_sub(80),
            },
        }
    }

    async fn remove_watermark(&self, image: DynamicImage) -> unwatermark::Result<DynamicImage> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((image.width(), image.height()));

        if self.hang_calls.contains(&call) {
            std::future::pending::<()>().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_calls.contains(&call) {
            return Err(Error::Engine(format!("mock failure on call {call}")));
        }

        // Blank the watermark corner so the result differs from the input
        let mut rgba = image.to_rgba8();
        let (x, y) = (rgba.width().saturating_sub(1), rgba.height().saturating_sub(1));
        if let Some(pixel) = rgba.get_pixel_mut_checked(x, y) {
            *pixel = Rgba([0, 0, 0, 0]);
        }
        Ok(DynamicImage::ImageRgba8(rgba))
    }

    async fn check_originality(&self, source: &SourceFile) -> unwatermark::Result<Originality> {
        Ok(Originality {
            is_from_expected_source: true,
            is_unmodified: !source.name.contains("edited"),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// PNG magic number
pub const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Encode a solid-color image in the given format
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([30, 120, 200, 255]));
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image).to_rgb8()),
        _ => DynamicImage::ImageRgba8(image),
    };
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

pub fn png_file(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/png", image_bytes(width, height, ImageFormat::Png))
}

pub fn jpeg_file(name: &str, width: u32, height: u32) -> SourceFile {
    SourceFile::new(name, "image/jpeg", image_bytes(width, height, ImageFormat::Jpeg))
}

/// Declared as PNG but undecodable
pub fn corrupt_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/png", b"not an image at all".to_vec())
}

/// Declared as a media type the intake rejects
pub fn gif_file(name: &str) -> SourceFile {
    SourceFile::new(name, "image/gif", b"GIF89a".to_vec())
}
