//! Queue mode: preload every source, then transform strictly one at a time

use super::context::BatchContext;
use super::stages::{decode_source, process_item};
use crate::error::{Error, Result};
use crate::progress::Progress;
use crate::types::{Event, ItemStatus};

/// Drive a queued batch to completion
///
/// Runs on its own task. A superseded batch ends with
/// [`Event::BatchAbandoned`] and `Err(Error::Superseded)`.
pub(crate) async fn run_queue(ctx: BatchContext) -> Result<Progress> {
    let result = async {
        preload(&ctx).await?;
        transform_all(&ctx).await
    }
    .await;

    match &result {
        Ok(progress) => {
            tracing::info!(batch = ctx.generation, %progress, "batch finished");
            ctx.emit(Event::BatchFinished {
                generation: ctx.generation,
                progress: *progress,
            });
        }
        Err(Error::Superseded { .. }) => {
            tracing::info!(batch = ctx.generation, "batch abandoned");
            ctx.emit(Event::BatchAbandoned {
                generation: ctx.generation,
            });
        }
        Err(e) => {
            tracing::error!(batch = ctx.generation, error = %e, "batch stopped");
            ctx.emit(Event::BatchAbandoned {
                generation: ctx.generation,
            });
        }
    }

    result
}

/// Decode every pending source so the host can show previews before any
/// engine work starts
///
/// A source that fails to decode is left pending; the transform pass decodes
/// it again and records the failure on the item.
async fn preload(ctx: &BatchContext) -> Result<()> {
    for id in ctx.store.item_ids(ctx.generation).await? {
        ctx.ensure_live()?;

        let source = ctx
            .store
            .with_item(ctx.generation, id, |item| {
                (item.status() == ItemStatus::Pending && !item.has_decoded())
                    .then(|| item.source().clone())
            })
            .await?;
        let Some(source) = source else { continue };

        match decode_source(source).await {
            Ok(image) => {
                let (width, height) = (image.width(), image.height());
                ctx.store
                    .with_item(ctx.generation, id, |item| item.set_decoded(image))
                    .await?;
                ctx.emit(Event::Preloaded { id, width, height });
            }
            Err(e) => {
                tracing::warn!(batch = ctx.generation, %id, error = %e, "preload failed");
            }
        }
    }
    Ok(())
}

/// Process pending items in submission order, never more than one at a time
///
/// Items that are already terminal are skipped, and the counter starts from
/// their number, so running the pass again changes nothing.
async fn transform_all(ctx: &BatchContext) -> Result<Progress> {
    let pending = ctx.store.pending_ids(ctx.generation).await?;
    let total = ctx.store.batch_progress(ctx.generation).await?.total;
    ctx.store
        .set_processed_count(ctx.generation, total - pending.len())
        .await?;

    for id in pending {
        ctx.ensure_live()?;
        process_item(ctx, id).await?;
    }
    ctx.store.batch_progress(ctx.generation).await
}
