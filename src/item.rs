//! The unit of work and its lifecycle state

use bytes::Bytes;
use image::DynamicImage;

use crate::error::{Error, Result};
use crate::source::SourceFile;
use crate::types::{ItemId, ItemStatus, Originality, WatermarkInfo};

/// One submitted image tracked through the pipeline
///
/// Status changes go through [`Item::begin_processing`], [`Item::complete`] and
/// [`Item::fail`], which keep the artifact in step with the status: an item is
/// `Completed` exactly when it holds a non-empty artifact.
#[derive(Debug)]
pub struct Item {
    id: ItemId,
    source: SourceFile,
    status: ItemStatus,
    decoded: Option<DynamicImage>,
    dimensions: Option<(u32, u32)>,
    artifact: Option<Bytes>,
    watermark: Option<WatermarkInfo>,
    originality: Option<Originality>,
    error: Option<String>,
}

impl Item {
    /// Create a pending item for an admitted source
    pub fn new(id: ItemId, source: SourceFile) -> Self {
        Self {
            id,
            source,
            status: ItemStatus::Pending,
            decoded: None,
            dimensions: None,
            artifact: None,
            watermark: None,
            originality: None,
            error: None,
        }
    }

    /// Item ID
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The original source
    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    /// Original file name
    pub fn display_name(&self) -> &str {
        &self.source.name
    }

    /// Current status
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Decoded dimensions, once the source has been loaded
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// Whether a decoded image is waiting for the engine
    pub fn has_decoded(&self) -> bool {
        self.decoded.is_some()
    }

    /// PNG result, present only when `Completed`
    pub fn artifact(&self) -> Option<&Bytes> {
        self.artifact.as_ref()
    }

    /// Watermark geometry reported by the engine
    pub fn watermark(&self) -> Option<WatermarkInfo> {
        self.watermark
    }

    /// Provenance verdict reported by the engine
    pub fn originality(&self) -> Option<Originality> {
        self.originality
    }

    /// Failure message, present only when `Error`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Store the decoded source; does not change status
    pub(crate) fn set_decoded(&mut self, image: DynamicImage) {
        self.record_dimensions(image.width(), image.height());
        self.decoded = Some(image);
    }

    pub(crate) fn record_dimensions(&mut self, width: u32, height: u32) {
        self.dimensions = Some((width, height));
    }

    /// Hand the decoded image over to the caller (the engine call consumes it)
    pub(crate) fn take_decoded(&mut self) -> Option<DynamicImage> {
        self.decoded.take()
    }

    pub(crate) fn set_inspection(&mut self, watermark: WatermarkInfo, originality: Originality) {
        self.watermark = Some(watermark);
        self.originality = Some(originality);
    }

    fn transition(&mut self, to: ItemStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// `Pending → Processing`
    pub(crate) fn begin_processing(&mut self) -> Result<()> {
        self.transition(ItemStatus::Processing)
    }

    /// `Processing → Completed`, storing the PNG artifact
    pub(crate) fn complete(&mut self, artifact: Bytes) -> Result<()> {
        if artifact.is_empty() {
            return Err(Error::Encode("encoder produced an empty artifact".into()));
        }
        self.transition(ItemStatus::Completed)?;
        self.artifact = Some(artifact);
        self.decoded = None;
        Ok(())
    }

    /// `Processing → Error`, dropping any decoded image or artifact
    pub(crate) fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.transition(ItemStatus::Error)?;
        self.artifact = None;
        self.decoded = None;
        self.error = Some(message.into());
        Ok(())
    }

    /// Read-only copy for hosts and exporters; leaves the decoded image behind
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            display_name: self.source.name.clone(),
            media_type: self.source.media_type.clone(),
            size: self.source.size(),
            status: self.status,
            dimensions: self.dimensions,
            artifact: self.artifact.clone(),
            watermark: self.watermark,
            originality: self.originality,
            error: self.error.clone(),
        }
    }
}

/// Point-in-time view of an [`Item`]
///
/// This is the only form in which hosts see items; the live [`Item`] stays
/// inside the queue store.
///
/// ```compile_fail
/// use unwatermark::Item;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSnapshot {
    /// Item ID
    pub id: ItemId,
    /// Original file name
    pub display_name: String,
    /// Declared media type of the source
    pub media_type: String,
    /// Source size in bytes
    pub size: u64,
    /// Status at snapshot time
    pub status: ItemStatus,
    /// Decoded dimensions, if loaded
    pub dimensions: Option<(u32, u32)>,
    /// PNG result (`Completed` only)
    pub artifact: Option<Bytes>,
    /// Watermark geometry, if inspected
    pub watermark: Option<WatermarkInfo>,
    /// Provenance verdict, if inspected
    pub originality: Option<Originality>,
    /// Failure message (`Error` only)
    pub error: Option<String>,
}
