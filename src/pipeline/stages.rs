//! Per-item stages: load, inspect, transform, finalize

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::time::Instant;

use super::context::BatchContext;
use crate::error::{Error, Result};
use crate::source::SourceFile;
use crate::types::{Event, ItemId, ItemStatus};

/// Decode a source on the blocking pool
pub(crate) async fn decode_source(source: SourceFile) -> Result<DynamicImage> {
    tokio::task::spawn_blocking(move || {
        image::load_from_memory(&source.data).map_err(|e| Error::Decode {
            name: source.name.clone(),
            reason: e.to_string(),
        })
    })
    .await?
}

/// Encode an engine result as PNG on the blocking pool
pub(crate) async fn encode_png(image: DynamicImage) -> Result<Bytes> {
    tokio::task::spawn_blocking(move || -> Result<Bytes> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| Error::Encode(e.to_string()))?;
        Ok(Bytes::from(buffer.into_inner()))
    })
    .await?
}

/// Source and (if preloaded) decoded image, handed out when an item starts
type Claimed = (SourceFile, Option<DynamicImage>);

/// Take one item from `Pending` to a terminal state
///
/// Returns `Ok(None)` when the item was no longer pending (nothing to do).
/// Engine, decode and encode failures are recorded on the item and counted;
/// only a superseded batch surfaces as an error, in which case the item is
/// left untouched in the discarded batch.
pub(crate) async fn process_item(ctx: &BatchContext, id: ItemId) -> Result<Option<ItemStatus>> {
    let claimed = ctx
        .store
        .with_item(ctx.generation, id, |item| -> Result<Option<Claimed>> {
            if item.status() != ItemStatus::Pending {
                return Ok(None);
            }
            item.begin_processing()?;
            Ok(Some((item.source().clone(), item.take_decoded())))
        })
        .await??;

    let Some((source, decoded)) = claimed else {
        tracing::debug!(batch = ctx.generation, %id, "item no longer pending, skipping");
        return Ok(None);
    };

    ctx.emit(Event::Processing { id });
    tracing::debug!(batch = ctx.generation, %id, name = %source.name, "processing item");

    let started = Instant::now();
    let outcome = transform(ctx, id, source, decoded).await;

    let status = match outcome {
        Err(e @ Error::Superseded { .. }) => return Err(e),
        Ok(artifact) => {
            let artifact_bytes = artifact.len();
            let rejected = ctx
                .store
                .with_item(ctx.generation, id, |item| match item.complete(artifact) {
                    Ok(()) => Ok(None),
                    Err(e) => {
                        let message = e.to_string();
                        item.fail(message.clone()).map(|()| Some(message))
                    }
                })
                .await??;

            match rejected {
                None => {
                    tracing::info!(
                        batch = ctx.generation,
                        %id,
                        artifact_bytes,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "item completed"
                    );
                    ctx.emit(Event::Completed { id, artifact_bytes });
                    ItemStatus::Completed
                }
                Some(message) => {
                    tracing::warn!(batch = ctx.generation, %id, error = %message, "item failed");
                    ctx.emit(Event::Failed { id, error: message });
                    ItemStatus::Error
                }
            }
        }
        Err(e) => {
            if e.is_item_failure() {
                tracing::warn!(batch = ctx.generation, %id, error = %e, "item failed");
            } else {
                tracing::error!(batch = ctx.generation, %id, error = %e, "item failed unexpectedly");
            }
            let message = e.to_string();
            ctx.store
                .with_item(ctx.generation, id, |item| item.fail(message.clone()))
                .await??;
            ctx.emit(Event::Failed { id, error: message });
            ItemStatus::Error
        }
    };

    let progress = ctx.store.increment_processed(ctx.generation).await?;
    ctx.emit(Event::Progress(progress));
    Ok(Some(status))
}

/// Load (if not preloaded), inspect and clean one image, returning the PNG
async fn transform(
    ctx: &BatchContext,
    id: ItemId,
    source: SourceFile,
    decoded: Option<DynamicImage>,
) -> Result<Bytes> {
    let image = match decoded {
        Some(image) => image,
        None => {
            let image = decode_source(source.clone()).await?;
            let (width, height) = (image.width(), image.height());
            ctx.store
                .with_item(ctx.generation, id, |item| {
                    item.record_dimensions(width, height)
                })
                .await?;
            ctx.emit(Event::Preloaded { id, width, height });
            image
        }
    };

    let watermark = ctx.engine.describe_watermark(image.width(), image.height());
    let originality = tokio::select! {
        _ = ctx.cancel.cancelled() => return Err(ctx.superseded()),
        result = ctx.engine.check_originality(&source) => result?,
    };
    ctx.store
        .with_item(ctx.generation, id, |item| {
            item.set_inspection(watermark, originality)
        })
        .await?;
    tracing::debug!(
        %id,
        engine = ctx.engine.name(),
        watermark_size = watermark.size,
        clean = originality.is_clean(),
        "inspection finished"
    );

    let cleaned = tokio::select! {
        _ = ctx.cancel.cancelled() => return Err(ctx.superseded()),
        result = ctx.engine.remove_watermark(image) => result?,
    };

    ctx.ensure_live()?;
    encode_png(cleaned).await
}
