//! Submitted source files

use bytes::Bytes;
use std::path::Path;

use crate::error::Result;

/// JPEG media type
pub const MEDIA_TYPE_JPEG: &str = "image/jpeg";
/// PNG media type
pub const MEDIA_TYPE_PNG: &str = "image/png";
/// WebP media type
pub const MEDIA_TYPE_WEBP: &str = "image/webp";

/// A file-like input as handed over by the host
///
/// The declared media type is taken at face value; content is only inspected
/// when the pipeline decodes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Original file name, used for display and output naming
    pub name: String,
    /// Declared media type (e.g. `image/png`)
    pub media_type: String,
    /// Raw file content
    pub data: Bytes,
}

impl SourceFile {
    /// Create a source from in-memory content
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Read a source from disk, declaring its media type from the extension
    ///
    /// Unknown extensions get `application/octet-stream`, which intake rejects.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let media_type = media_type_for_path(path);

        tracing::debug!(?path, media_type, size = data.len(), "read source file");

        Ok(Self::new(name, media_type, data))
    }

    /// Size of the content in bytes
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Guess a media type from a file extension (case-insensitive)
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => MEDIA_TYPE_JPEG,
        "png" => MEDIA_TYPE_PNG,
        "webp" => MEDIA_TYPE_WEBP,
        _ => "application/octet-stream",
    }
}
