//! Trait for the external watermark engine

use async_trait::async_trait;
use image::DynamicImage;

use crate::source::SourceFile;
use crate::types::{Originality, WatermarkInfo};

/// Interface to the watermark detection/removal service
///
/// The engine is treated as a scarce, non-reentrant resource: the pipeline
/// never has more than one [`remove_watermark`](Self::remove_watermark) call
/// in flight for a batch.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use image::DynamicImage;
/// use unwatermark::{Originality, SourceFile, WatermarkEngine, WatermarkInfo};
///
/// /// Returns every image unchanged
/// struct Identity;
///
/// #[async_trait]
/// impl WatermarkEngine for Identity {
///     fn describe_watermark(&self, _width: u32, _height: u32) -> WatermarkInfo {
///         WatermarkInfo::default()
///     }
///
///     async fn remove_watermark(&self, image: DynamicImage) -> unwatermark::Result<DynamicImage> {
///         Ok(image)
///     }
///
///     async fn check_originality(&self, _source: &SourceFile) -> unwatermark::Result<Originality> {
///         Ok(Originality::default())
///     }
///
///     fn name(&self) -> &'static str {
///         "identity"
///     }
/// }
/// ```
#[async_trait]
pub trait WatermarkEngine: Send + Sync {
    /// Watermark geometry for an image of the given dimensions
    ///
    /// Pure function of the dimensions; used for display and diagnostics only.
    fn describe_watermark(&self, width: u32, height: u32) -> WatermarkInfo;

    /// Remove the watermark from a decoded image
    ///
    /// # Errors
    ///
    /// Any error marks the item as failed; it is not retried.
    async fn remove_watermark(&self, image: DynamicImage) -> crate::Result<DynamicImage>;

    /// Check whether the source came from the expected generator unmodified
    ///
    /// # Errors
    ///
    /// Handled like a removal failure: the item is marked as failed.
    async fn check_originality(&self, source: &SourceFile) -> crate::Result<Originality>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
