//! No-op engine for graceful degradation

use async_trait::async_trait;
use image::DynamicImage;

use super::traits::WatermarkEngine;
use crate::source::SourceFile;
use crate::types::{Originality, WatermarkInfo};

/// Engine used when no removal backend is configured
///
/// Describes an empty watermark and rejects removal and originality checks with
/// `Error::NotSupported`, so every submitted item ends in the `error` state
/// without disturbing the rest of the pipeline.
///
/// # Examples
///
/// ```
/// use unwatermark::{NoOpEngine, WatermarkEngine};
///
/// # #[tokio::main]
/// # async fn main() {
/// let engine = NoOpEngine;
/// let image = image::DynamicImage::new_rgba8(8, 8);
/// assert!(engine.remove_watermark(image).await.is_err());
/// # }
/// ```
pub struct NoOpEngine;

#[async_trait]
impl WatermarkEngine for NoOpEngine {
    fn describe_watermark(&self, _width: u32, _height: u32) -> WatermarkInfo {
        WatermarkInfo::default()
    }

    async fn remove_watermark(&self, _image: DynamicImage) -> crate::Result<DynamicImage> {
        Err(crate::Error::NotSupported(
            "watermark removal requires an engine implementation".into(),
        ))
    }

    async fn check_originality(&self, _source: &SourceFile) -> crate::Result<Originality> {
        Err(crate::Error::NotSupported(
            "originality checks require an engine implementation".into(),
        ))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_rejects_work_but_describes_empty_geometry() {
        let engine = NoOpEngine;

        assert_eq!(engine.describe_watermark(2048, 2048), WatermarkInfo::default());
        assert!(matches!(
            engine.remove_watermark(DynamicImage::new_rgb8(2, 2)).await,
            Err(crate::Error::NotSupported(_))
        ));
        let source = SourceFile::new("a.png", "image/png", vec![1u8]);
        assert!(engine.check_originality(&source).await.is_err());
        assert_eq!(engine.name(), "noop");
    }
}
