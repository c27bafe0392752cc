//! Intake hand-off and processing-mode dispatch

use tokio::task::JoinHandle;

use super::context::BatchContext;
use super::queue::run_queue;
use super::stages::process_item;
use super::Unwatermarker;
use crate::error::{Error, Result};
use crate::intake::admit_batch;
use crate::item::ItemSnapshot;
use crate::progress::Progress;
use crate::source::SourceFile;
use crate::types::{Event, ItemId, ProcessingMode};

/// What a successful submission started
#[derive(Debug)]
pub enum Submission {
    /// Exactly one file was admitted; it has already been processed
    Single(ItemSnapshot),
    /// Several files were admitted; the queue runs in the background
    Queued(QueuedBatch),
}

/// Handle to a batch being processed in queue mode
#[derive(Debug)]
pub struct QueuedBatch {
    /// Batch generation
    pub generation: u64,
    /// Admitted item ids, in submission order
    pub ids: Vec<ItemId>,
    handle: JoinHandle<Result<Progress>>,
}

impl QueuedBatch {
    /// Number of admitted items
    pub fn total(&self) -> usize {
        self.ids.len()
    }

    /// Wait for the transform pass to finish
    ///
    /// # Errors
    ///
    /// [`Error::Superseded`] if a newer submission or a reset replaced this
    /// batch before it finished.
    pub async fn wait(self) -> Result<Progress> {
        self.handle.await?
    }
}

impl Unwatermarker {
    /// Submit a file list as a new batch
    ///
    /// Files failing the media type or size check are dropped. If none remain,
    /// nothing happens and `Ok(None)` is returned; the current batch stays as
    /// it was. Otherwise the current batch is replaced (any in-flight work on
    /// it is abandoned) and:
    ///
    /// - one admitted file is processed immediately and its final snapshot is
    ///   returned as [`Submission::Single`];
    /// - two or more are processed in a background task, returned as
    ///   [`Submission::Queued`].
    ///
    /// # Errors
    ///
    /// Item failures never surface here; they are recorded on the item. In
    /// single mode, [`Error::Superseded`] is returned if another submission
    /// replaced the batch first.
    pub async fn submit(&self, files: Vec<SourceFile>) -> Result<Option<Submission>> {
        let submitted_at_ms = chrono::Utc::now().timestamp_millis();
        let Some(admission) =
            admit_batch(&self.store, files, &self.config.intake, submitted_at_ms).await
        else {
            tracing::info!("no admissible files, queue unchanged");
            return Ok(None);
        };

        let total = admission.ids.len();
        let ctx = BatchContext::new(
            admission.ticket,
            self.store.clone(),
            self.engine.clone(),
            self.event_tx.clone(),
        );

        self.emit_event(Event::BatchCreated {
            generation: ctx.generation,
            total,
            mode: admission.mode,
        });
        self.emit_event(Event::Progress(Progress::new(0, total)));

        match admission.mode {
            ProcessingMode::Single => {
                let id = admission.ids[0];
                let snapshot = self.process_single(&ctx, id).await?;
                Ok(Some(Submission::Single(snapshot)))
            }
            ProcessingMode::Queue => {
                let generation = ctx.generation;
                let handle = tokio::spawn(run_queue(ctx));
                Ok(Some(Submission::Queued(QueuedBatch {
                    generation,
                    ids: admission.ids,
                    handle,
                })))
            }
        }
    }

    /// Single mode: no preload pass, the one item goes straight through
    async fn process_single(&self, ctx: &BatchContext, id: ItemId) -> Result<ItemSnapshot> {
        if let Err(e) = process_item(ctx, id).await {
            if matches!(e, Error::Superseded { .. }) {
                self.emit_event(Event::BatchAbandoned {
                    generation: ctx.generation,
                });
            }
            return Err(e);
        }

        let progress = self.store.batch_progress(ctx.generation).await?;
        self.emit_event(Event::BatchFinished {
            generation: ctx.generation,
            progress,
        });
        self.store.item(id).await.ok_or(Error::NotFound(id))
    }
}
