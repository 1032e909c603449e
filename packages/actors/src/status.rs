//! The only writer of item status after a claim.

use db::DbError;
use db::repositories::FetchQueueRepository;
use queue_core::{FetchItem, FetchStatus};

/// Commits status transitions.
///
/// Each call is its own immediately committed statement, separate from any
/// writes the handler made, so a failed handler still gets its status.
#[derive(Clone)]
pub struct StatusUpdater {
    queue: FetchQueueRepository,
}

impl StatusUpdater {
    pub fn new(queue: FetchQueueRepository) -> Self {
        Self { queue }
    }

    /// Move `item` to `status`. Returns the updated item, or `None` when the
    /// transition was refused or the item is gone.
    pub async fn set_status(&self, item: &FetchItem, status: FetchStatus) -> Result<Option<FetchItem>, DbError> {
        let updated = self.queue.set_status(item.id, status).await?;
        match &updated {
            Some(_) => tracing::debug!("Item {} ({}) -> {}", item.id, item.external_id, status),
            None => tracing::warn!(
                "Refused status change of item {} ({}) to {}",
                item.id,
                item.external_id,
                status
            ),
        }
        Ok(updated)
    }

    /// Same as `set_status`, logging instead of returning a write error.
    pub async fn set_status_logged(&self, item: &FetchItem, status: FetchStatus) -> bool {
        match self.set_status(item, status).await {
            Ok(updated) => updated.is_some(),
            Err(e) => {
                tracing::warn!("Failed to set item {} to {}: {}", item.id, status, e);
                false
            }
        }
    }
}
