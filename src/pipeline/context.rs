//! State bound to one batch generation

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::engine::WatermarkEngine;
use crate::error::{Error, Result};
use crate::store::{BatchTicket, QueueStore};
use crate::types::Event;

/// Everything a pipeline pass needs, bound to one batch generation
///
/// Cloned into the background task in queue mode.
#[derive(Clone)]
pub(crate) struct BatchContext {
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
    pub(crate) store: QueueStore,
    pub(crate) engine: Arc<dyn WatermarkEngine>,
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl BatchContext {
    pub(crate) fn new(
        ticket: BatchTicket,
        store: QueueStore,
        engine: Arc<dyn WatermarkEngine>,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            generation: ticket.generation,
            cancel: ticket.cancel,
            store,
            engine,
            event_tx,
        }
    }

    /// Publish an event; having no subscribers is fine
    pub(super) fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// Error out if the batch was replaced or reset
    pub(super) fn ensure_live(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Superseded {
                generation: self.generation,
            });
        }
        Ok(())
    }

    pub(super) fn superseded(&self) -> Error {
        Error::Superseded {
            generation: self.generation,
        }
    }
}
