//! Reset and export entry points

use super::Unwatermarker;
use crate::error::{Error, Result};
use crate::export::{self, Download};
use crate::types::{Event, ItemId};

impl Unwatermarker {
    /// Clear the queue, releasing every decoded image and artifact
    ///
    /// Any in-flight work on the cleared batch is abandoned. Resetting an
    /// empty queue is a no-op apart from the [`Event::Reset`] notification.
    pub async fn reset(&self) {
        match self.store.clear().await {
            Some(generation) => tracing::info!(batch = generation, "queue reset"),
            None => tracing::debug!("queue reset with no batch present"),
        }
        self.emit_event(Event::Reset);
    }

    /// Download for one completed item
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the id is not in the current batch
    /// - [`Error::NotExportable`] if the item has not completed
    pub async fn export_item(&self, id: ItemId) -> Result<Download> {
        let snapshot = self.store.item(id).await.ok_or(Error::NotFound(id))?;
        let download = export::export_item(&snapshot, &self.config.export)?;

        tracing::debug!(%id, file_name = %download.file_name, "item exported");
        self.emit_event(Event::Exported {
            file_name: download.file_name.clone(),
            entries: download.entries,
        });
        Ok(download)
    }

    /// Zip bundle of every item completed so far
    ///
    /// Returns `Ok(None)` when nothing has completed. Items completing while
    /// the bundle is being built are left for the next export.
    pub async fn export_bundle(&self) -> Result<Option<Download>> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let bundle = export::export_bundle(&self.store, &self.config.export, timestamp_ms).await?;

        if let Some(download) = &bundle {
            self.emit_event(Event::Exported {
                file_name: download.file_name.clone(),
                entries: download.entries,
            });
        }
        Ok(bundle)
    }

    /// Build the bundle and write it to the configured output directory
    ///
    /// Returns the written path, or `None` when nothing has completed.
    pub async fn save_bundle(&self) -> Result<Option<std::path::PathBuf>> {
        match self.export_bundle().await? {
            Some(download) => Ok(Some(download.save(&self.config.export).await?)),
            None => Ok(None),
        }
    }
}
