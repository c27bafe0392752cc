//! Pipeline controller split into focused submodules.
//!
//! The [`Unwatermarker`] struct and its methods are organized by concern:
//! - [`submit`] - Intake hand-off and mode dispatch
//! - [`queue`] - Queue mode: preload pass, then sequential transform pass
//! - [`stages`] - Per-item load, inspect, transform and finalize stages
//! - [`control`] - Reset and export entry points
//! - [`context`] - State bound to one batch generation

mod context;
mod control;
mod queue;
mod stages;
mod submit;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use submit::{QueuedBatch, Submission};

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::engine::WatermarkEngine;
use crate::item::ItemSnapshot;
use crate::progress::Progress;
use crate::store::QueueStore;
use crate::types::Event;

/// Main entry point (cloneable - all fields are Arc-wrapped)
///
/// Owns the queue store and the engine handle. Hosts submit file lists, watch
/// [`Event`]s or poll snapshots, and export finished artifacts.
#[derive(Clone)]
pub struct Unwatermarker {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Watermark engine shared by every batch
    pub(crate) engine: Arc<dyn WatermarkEngine>,
    /// The current batch
    pub(crate) store: QueueStore,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl Unwatermarker {
    /// Create a controller with an empty queue
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use unwatermark::{Config, NoOpEngine, Unwatermarker};
    ///
    /// let unwatermarker = Unwatermarker::new(Config::default(), Arc::new(NoOpEngine));
    /// assert_eq!(unwatermarker.get_config().export.file_prefix, "unwatermarked_");
    /// ```
    pub fn new(config: Config, engine: Arc<dyn WatermarkEngine>) -> Self {
        let (event_tx, _rx) = broadcast::channel(config.event_buffer.max(1));
        tracing::debug!(engine = engine.name(), "unwatermarker created");

        Self {
            config: Arc::new(config),
            engine,
            store: QueueStore::new(),
            event_tx,
        }
    }

    /// Subscribe to pipeline events
    ///
    /// Each subscriber gets every event emitted after it subscribed. A slow
    /// subscriber that falls more than `event_buffer` events behind receives
    /// `RecvError::Lagged` and skips ahead.
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use unwatermark::{Config, NoOpEngine, Unwatermarker};
    /// # async fn example() {
    /// let unwatermarker = Unwatermarker::new(Config::default(), Arc::new(NoOpEngine));
    /// let mut events = unwatermarker.subscribe();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         tracing::info!(?event, "pipeline event");
    ///     }
    /// });
    /// # }
    /// ```
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration (cheap Arc clone)
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// The queue store, for read-only inspection
    pub fn store(&self) -> &QueueStore {
        &self.store
    }

    /// Name of the configured engine
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// `(processed, total)` for the current batch
    pub async fn progress(&self) -> Progress {
        self.store.progress().await
    }

    /// Snapshot of every item in the current batch
    pub async fn items(&self) -> Vec<ItemSnapshot> {
        self.store.items().await
    }

    /// Whether a batch export would produce an archive right now
    pub async fn has_exportable(&self) -> bool {
        self.store.has_completed().await
    }

    /// Emit an event to all subscribers
    ///
    /// Having no subscribers is fine; the event is dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
