//! Event helpers and custom assertions for integration tests

use std::time::Duration;
use tokio::sync::broadcast;
use unwatermark::{Event, ItemId, ItemStatus, Unwatermarker};

/// Collect events until `stop_predicate` matches (inclusive) or `timeout` elapses
pub async fn collect_events_until<F>(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
    stop_predicate: F,
) -> Vec<Event>
where
    F: Fn(&Event) -> bool,
{
    let mut collected = Vec::new();

    let _ = tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            let should_stop = stop_predicate(&event);
            collected.push(event);
            if should_stop {
                break;
            }
        }
    })
    .await;

    collected
}

/// Wait until the given item enters the engine call
pub async fn wait_for_processing(
    events: &mut broadcast::Receiver<Event>,
    id: ItemId,
    timeout: Duration,
) -> bool {
    tokio::time::timeout(timeout, async {
        while let Ok(event) = events.recv().await {
            if matches!(event, Event::Processing { id: event_id } if event_id == id) {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false)
}

/// Ids in the order they reached a terminal state
pub fn terminal_order(events: &[Event]) -> Vec<ItemId> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Completed { id, .. } | Event::Failed { id, .. } => Some(*id),
            _ => None,
        })
        .collect()
}

/// Progress values reported after each terminal transition
pub fn progress_values(events: &[Event]) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Progress(p) => Some((p.processed, p.total)),
            _ => None,
        })
        .collect()
}

/// Assert the status of every item in the current batch, in order
pub async fn assert_statuses(unwatermarker: &Unwatermarker, expected: &[ItemStatus]) {
    let actual: Vec<ItemStatus> = unwatermarker
        .items()
        .await
        .iter()
        .map(|item| item.status)
        .collect();
    assert_eq!(actual, expected, "item statuses");
}

/// Assert that a completed item's artifact is a PNG and a failed one has none
pub async fn assert_artifacts_match_status(unwatermarker: &Unwatermarker) {
    for item in unwatermarker.items().await {
        match item.status {
            ItemStatus::Completed => {
                let artifact = item.artifact.as_ref().expect("completed item has artifact");
                assert!(
                    artifact.starts_with(super::fixtures::PNG_MAGIC),
                    "artifact for {} is not PNG",
                    item.display_name
                );
            }
            _ => assert!(
                item.artifact.is_none(),
                "{} has an artifact while {}",
                item.display_name,
                item.status
            ),
        }
    }
}
