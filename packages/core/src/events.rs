//! Event types emitted by the crawler for observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FetchKind, ItemId};

/// Events emitted while the fetch queue is worked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FetchEvent {
    /// An item was claimed into FETCHING.
    ItemClaimed {
        item_id: ItemId,
        external_id: String,
        kind: FetchKind,
        timestamp: DateTime<Utc>,
    },
    /// An item was processed and marked DONE.
    ItemCompleted {
        item_id: ItemId,
        kind: FetchKind,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// An item failed and was marked FAIL.
    ItemFailed {
        item_id: ItemId,
        kind: FetchKind,
        error: String,
        timestamp: DateTime<Utc>,
    },
    /// An item hit the rate limit, went back to READY and the worker stalled.
    ItemRequeued {
        item_id: ItemId,
        stall_secs: u64,
        timestamp: DateTime<Utc>,
    },
    /// A match listing was merged into the queue.
    MatchesExpanded {
        player: String,
        listed: usize,
        inserted: usize,
        revived: usize,
        raised: usize,
        timestamp: DateTime<Utc>,
    },
}

impl FetchEvent {
    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            FetchEvent::ItemClaimed { timestamp, .. } => *timestamp,
            FetchEvent::ItemCompleted { timestamp, .. } => *timestamp,
            FetchEvent::ItemFailed { timestamp, .. } => *timestamp,
            FetchEvent::ItemRequeued { timestamp, .. } => *timestamp,
            FetchEvent::MatchesExpanded { timestamp, .. } => *timestamp,
        }
    }

    /// Get the item ID associated with this event, if any.
    pub fn item_id(&self) -> Option<ItemId> {
        match self {
            FetchEvent::ItemClaimed { item_id, .. } => Some(*item_id),
            FetchEvent::ItemCompleted { item_id, .. } => Some(*item_id),
            FetchEvent::ItemFailed { item_id, .. } => Some(*item_id),
            FetchEvent::ItemRequeued { item_id, .. } => Some(*item_id),
            FetchEvent::MatchesExpanded { .. } => None,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            FetchEvent::ItemClaimed {
                item_id,
                external_id,
                kind,
                ..
            } => format!("Item {} claimed ({} {})", item_id, kind, external_id),
            FetchEvent::ItemCompleted {
                item_id,
                duration_ms,
                ..
            } => format!("Item {} done in {}ms", item_id, duration_ms),
            FetchEvent::ItemFailed { item_id, error, .. } => {
                format!("Item {} failed: {}", item_id, error)
            }
            FetchEvent::ItemRequeued {
                item_id,
                stall_secs,
                ..
            } => format!("Item {} requeued, stalling {}s", item_id, stall_secs),
            FetchEvent::MatchesExpanded {
                player,
                listed,
                inserted,
                ..
            } => format!("{} matches listed for {}, {} new", listed, player, inserted),
        }
    }
}
