//! Bundle exporter: single-artifact downloads and the zip bundle
//!
//! Export never mutates the queue store. The batch export collects the
//! `Completed` items in one pass; anything that completes afterwards belongs to
//! the next export.

use bytes::Bytes;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{ArchiveCompression, ExportConfig, FileCollisionAction};
use crate::error::{Error, Result};
use crate::item::ItemSnapshot;
use crate::store::QueueStore;
use crate::types::ItemStatus;
use crate::utils::{artifact_file_name, bundle_file_name, dedupe_name, get_unique_path};

/// A ready-to-save download: a file name and its bytes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    /// Suggested file name
    pub file_name: String,
    /// File content (PNG for single artifacts, zip for bundles)
    pub data: Bytes,
    /// Number of artifacts contained (1 for a single artifact)
    pub entries: usize,
}

impl Download {
    /// Write the download into `dir`, resolving name collisions with `collision`
    ///
    /// Returns the path actually written.
    pub async fn save_to(&self, dir: &Path, collision: FileCollisionAction) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let target = dir.join(&self.file_name);
        let path =
            tokio::task::spawn_blocking(move || get_unique_path(&target, collision)).await??;
        tokio::fs::write(&path, &self.data).await?;

        tracing::info!(
            ?path,
            bytes = self.data.len(),
            entries = self.entries,
            "download saved"
        );
        Ok(path)
    }

    /// Write the download using the configured output directory and collision action
    pub async fn save(&self, config: &ExportConfig) -> Result<PathBuf> {
        self.save_to(&config.output_dir, config.file_collision).await
    }
}

/// Download for a single `Completed` item
///
/// # Errors
///
/// [`Error::NotExportable`] if the item is in any other state.
pub fn export_item(item: &ItemSnapshot, config: &ExportConfig) -> Result<Download> {
    let artifact = match (&item.status, &item.artifact) {
        (ItemStatus::Completed, Some(artifact)) => artifact.clone(),
        _ => {
            return Err(Error::NotExportable {
                id: item.id,
                status: item.status,
            });
        }
    };

    Ok(Download {
        file_name: artifact_file_name(&config.file_prefix, &item.display_name),
        data: artifact,
        entries: 1,
    })
}

/// Bundle every currently `Completed` item into one zip archive
///
/// Returns `Ok(None)` when nothing has completed; an empty archive is never
/// produced.
pub async fn export_bundle(
    store: &QueueStore,
    config: &ExportConfig,
    timestamp_ms: i64,
) -> Result<Option<Download>> {
    let completed = store.completed().await;
    if completed.is_empty() {
        tracing::debug!("no completed items, skipping bundle export");
        return Ok(None);
    }

    let mut taken = HashSet::with_capacity(completed.len());
    let mut entries = Vec::with_capacity(completed.len());
    for item in &completed {
        let download = export_item(item, config)?;
        let name = dedupe_name(&download.file_name, &taken);
        taken.insert(name.clone());
        entries.push((name, download.data));
    }

    let entry_count = entries.len();
    let compression = config.compression;
    let archive =
        tokio::task::spawn_blocking(move || build_archive(&entries, compression)).await??;

    let file_name = bundle_file_name(&config.file_prefix, timestamp_ms);
    tracing::info!(
        file_name,
        entries = entry_count,
        bytes = archive.len(),
        "bundle archive built"
    );

    Ok(Some(Download {
        file_name,
        data: Bytes::from(archive),
        entries: entry_count,
    }))
}

/// Serialize `(name, content)` pairs into an in-memory zip archive
fn build_archive(entries: &[(String, Bytes)], compression: ArchiveCompression) -> Result<Vec<u8>> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default().compression_method(compression.into());

    for (name, data) in entries {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(data)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}
