//! Queue store: the current batch and its processed counter
//!
//! The store is an explicitly owned handle (cheap to clone, all state behind one
//! `Arc<RwLock<_>>`). Reads are public and return snapshots. Writes are
//! crate-internal and split by owner: intake replaces or clears the batch, the
//! pipeline mutates items and the counter. Every pipeline write names the batch
//! generation it belongs to, so writes from a superseded batch are rejected
//! with [`Error::Superseded`] instead of landing on the new one.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::item::{Item, ItemSnapshot};
use crate::progress::Progress;
use crate::types::{ItemId, ItemStatus};

/// One intake event's worth of items
#[derive(Debug)]
struct Batch {
    generation: u64,
    items: Vec<Item>,
    processed: usize,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct StoreState {
    batch: Option<Batch>,
    last_generation: u64,
}

/// Identifies a live batch to the pipeline
#[derive(Clone, Debug)]
pub(crate) struct BatchTicket {
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
}

/// Holder of the current batch (cloneable - state is Arc-wrapped)
#[derive(Clone, Debug, Default)]
pub struct QueueStore {
    state: Arc<RwLock<StoreState>>,
}

impl QueueStore {
    /// Create an empty store (no batch)
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current batch wholesale and reset the processed count
    ///
    /// The previous batch's cancellation token is triggered so an in-flight
    /// transform pass stops at its next suspension point.
    pub(crate) async fn replace(&self, items: Vec<Item>) -> BatchTicket {
        let mut state = self.state.write().await;

        if let Some(previous) = state.batch.take() {
            previous.cancel.cancel();
            tracing::debug!(
                batch = previous.generation,
                "previous batch superseded"
            );
        }

        state.last_generation += 1;
        let ticket = BatchTicket {
            generation: state.last_generation,
            cancel: CancellationToken::new(),
        };
        state.batch = Some(Batch {
            generation: ticket.generation,
            items,
            processed: 0,
            cancel: ticket.cancel.clone(),
        });

        ticket
    }

    /// Drop the current batch, releasing decoded images and artifacts
    ///
    /// Returns the generation that was cleared, if any.
    pub(crate) async fn clear(&self) -> Option<u64> {
        let mut state = self.state.write().await;
        let batch = state.batch.take()?;
        batch.cancel.cancel();
        Some(batch.generation)
    }

    /// Generation of the current batch
    pub async fn generation(&self) -> Option<u64> {
        self.state.read().await.batch.as_ref().map(|b| b.generation)
    }

    /// Whether a batch is present
    pub async fn has_batch(&self) -> bool {
        self.state.read().await.batch.is_some()
    }

    /// Number of items in the current batch (0 when there is none)
    pub async fn len(&self) -> usize {
        self.state
            .read()
            .await
            .batch
            .as_ref()
            .map_or(0, |b| b.items.len())
    }

    /// Whether the current batch is absent or empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Items that reached a terminal state in the current batch
    pub async fn processed_count(&self) -> usize {
        self.state
            .read()
            .await
            .batch
            .as_ref()
            .map_or(0, |b| b.processed)
    }

    /// `(processed, total)` for the current batch
    pub async fn progress(&self) -> Progress {
        let state = self.state.read().await;
        match &state.batch {
            Some(batch) => Progress::new(batch.processed, batch.items.len()),
            None => Progress::default(),
        }
    }

    /// Snapshot of every item, in submission order
    pub async fn items(&self) -> Vec<ItemSnapshot> {
        let state = self.state.read().await;
        state
            .batch
            .as_ref()
            .map(|b| b.items.iter().map(Item::snapshot).collect())
            .unwrap_or_default()
    }

    /// Snapshot of a single item
    pub async fn item(&self, id: ItemId) -> Option<ItemSnapshot> {
        let state = self.state.read().await;
        state
            .batch
            .as_ref()?
            .items
            .iter()
            .find(|item| item.id() == id)
            .map(Item::snapshot)
    }

    /// Snapshot of the items that are `Completed` right now, in order
    ///
    /// Collected in one pass under a single read lock; items completing after
    /// the lock is released are not included.
    pub async fn completed(&self) -> Vec<ItemSnapshot> {
        let state = self.state.read().await;
        state
            .batch
            .as_ref()
            .map(|b| {
                b.items
                    .iter()
                    .filter(|item| item.status() == ItemStatus::Completed)
                    .map(Item::snapshot)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether at least one item is `Completed`
    pub async fn has_completed(&self) -> bool {
        let state = self.state.read().await;
        state.batch.as_ref().is_some_and(|b| {
            b.items
                .iter()
                .any(|item| item.status() == ItemStatus::Completed)
        })
    }

    /// Ids of every item in the batch, in submission order
    pub(crate) async fn item_ids(&self, generation: u64) -> Result<Vec<ItemId>> {
        let state = self.state.read().await;
        let batch = live_batch(&state, generation)?;
        Ok(batch.items.iter().map(Item::id).collect())
    }

    /// Ids of the items still `Pending`, in submission order
    pub(crate) async fn pending_ids(&self, generation: u64) -> Result<Vec<ItemId>> {
        let state = self.state.read().await;
        let batch = live_batch(&state, generation)?;
        Ok(batch
            .items
            .iter()
            .filter(|item| item.status() == ItemStatus::Pending)
            .map(Item::id)
            .collect())
    }

    /// Run `f` against one item of a live batch
    ///
    /// The lock is held only for the duration of `f`, which must not block.
    pub(crate) async fn with_item<R>(
        &self,
        generation: u64,
        id: ItemId,
        f: impl FnOnce(&mut Item) -> R,
    ) -> Result<R> {
        let mut state = self.state.write().await;
        let batch = live_batch_mut(&mut state, generation)?;
        let item = batch
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(Error::NotFound(id))?;
        Ok(f(item))
    }

    /// Progress of a specific batch
    pub(crate) async fn batch_progress(&self, generation: u64) -> Result<Progress> {
        let state = self.state.read().await;
        let batch = live_batch(&state, generation)?;
        Ok(Progress::new(batch.processed, batch.items.len()))
    }

    /// Overwrite the processed counter, clamped to the batch size
    pub(crate) async fn set_processed_count(&self, generation: u64, count: usize) -> Result<Progress> {
        let mut state = self.state.write().await;
        let batch = live_batch_mut(&mut state, generation)?;
        batch.processed = count.min(batch.items.len());
        Ok(Progress::new(batch.processed, batch.items.len()))
    }

    /// Count one more terminal transition and return the new progress
    pub(crate) async fn increment_processed(&self, generation: u64) -> Result<Progress> {
        let mut state = self.state.write().await;
        let batch = live_batch_mut(&mut state, generation)?;
        batch.processed += 1;
        Ok(Progress::new(batch.processed, batch.items.len()))
    }
}

fn live_batch(state: &StoreState, generation: u64) -> Result<&Batch> {
    match &state.batch {
        Some(batch) if batch.generation == generation => Ok(batch),
        _ => Err(Error::Superseded { generation }),
    }
}

fn live_batch_mut(state: &mut StoreState, generation: u64) -> Result<&mut Batch> {
    match &mut state.batch {
        Some(batch) if batch.generation == generation => Ok(batch),
        _ => Err(Error::Superseded { generation }),
    }
}
