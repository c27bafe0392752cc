//! Intake validation: raw file list → admitted batch

use crate::config::IntakeConfig;
use crate::item::Item;
use crate::source::SourceFile;
use crate::store::{BatchTicket, QueueStore};
use crate::types::{ItemId, ProcessingMode};

/// Result of a successful intake
#[derive(Debug)]
pub(crate) struct Admission {
    pub(crate) ticket: BatchTicket,
    pub(crate) mode: ProcessingMode,
    pub(crate) ids: Vec<ItemId>,
}

/// Whether a file passes the media type and size checks
pub fn is_admissible(source: &SourceFile, config: &IntakeConfig) -> bool {
    let type_allowed = config
        .allowed_media_types
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&source.media_type));

    type_allowed && source.size() <= config.max_file_size
}

/// Keep the admissible files, in submission order
///
/// Rejected files are dropped silently; they are only visible in debug logs.
pub fn admit(files: Vec<SourceFile>, config: &IntakeConfig) -> Vec<SourceFile> {
    files
        .into_iter()
        .filter(|source| {
            let ok = is_admissible(source, config);
            if !ok {
                tracing::debug!(
                    name = %source.name,
                    media_type = %source.media_type,
                    size = source.size(),
                    max_size = config.max_file_size,
                    "rejected file at intake"
                );
            }
            ok
        })
        .collect()
}

/// Wrap admitted files into pending items with batch-unique ids
pub(crate) fn build_items(admitted: Vec<SourceFile>, submitted_at_ms: i64) -> Vec<Item> {
    admitted
        .into_iter()
        .enumerate()
        .map(|(index, source)| Item::new(ItemId::for_position(submitted_at_ms, index), source))
        .collect()
}

/// Validate `files` and, if anything survives, replace the store's batch
///
/// Returns `None` without touching the store when no file is admissible.
pub(crate) async fn admit_batch(
    store: &QueueStore,
    files: Vec<SourceFile>,
    config: &IntakeConfig,
    submitted_at_ms: i64,
) -> Option<Admission> {
    let submitted = files.len();
    let admitted = admit(files, config);
    let mode = ProcessingMode::for_batch_size(admitted.len())?;

    let items = build_items(admitted, submitted_at_ms);
    let ids: Vec<ItemId> = items.iter().map(Item::id).collect();
    let ticket = store.replace(items).await;

    tracing::info!(
        batch = ticket.generation,
        submitted,
        admitted = ids.len(),
        ?mode,
        "new batch created"
    );

    Some(Admission { ticket, mode, ids })
}
