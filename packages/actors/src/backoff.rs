//! Rate-limit handling: requeue, then stall the worker.

use std::time::Duration;

use queue_core::{FetchItem, FetchStatus};
use tokio::time::Instant;

use crate::gate::CrawlGate;
use crate::status::StatusUpdater;

/// Stall for a rate limit: the Retry-After (or `default_secs`) plus `pad_secs`.
pub(crate) fn stall_for(retry_after_secs: Option<u64>, default_secs: u64, pad_secs: u64) -> Duration {
    Duration::from_secs(retry_after_secs.unwrap_or(default_secs).saturating_add(pad_secs))
}

pub struct BackoffController {
    status: StatusUpdater,
    gate: CrawlGate,
    default_delay_secs: u64,
    pad_secs: u64,
}

impl BackoffController {
    pub fn new(status: StatusUpdater, gate: CrawlGate, default_delay_secs: u64, pad_secs: u64) -> Self {
        Self {
            status,
            gate,
            default_delay_secs,
            pad_secs,
        }
    }

    /// How long to stall for a rate limit with the given Retry-After.
    pub fn delay_for(&self, retry_after_secs: Option<u64>) -> Duration {
        stall_for(retry_after_secs, self.default_delay_secs, self.pad_secs)
    }

    /// Put `item` back to READY, then block this worker for the stall.
    ///
    /// The gate closes before the requeue so no other caller reaches the API
    /// meanwhile. The requeue is committed before sleeping, and the stall is
    /// counted from that commit. The sleep is not cancelled by anything but
    /// dropping the future.
    pub async fn back_off(&self, item: &FetchItem, retry_after_secs: Option<u64>) -> Duration {
        let stall = self.delay_for(retry_after_secs);
        tracing::warn!(
            "Rate limited on item {} ({}); stalling {}s",
            item.id,
            item.external_id,
            stall.as_secs()
        );

        self.gate.pause_until(Instant::now() + stall);
        self.status.set_status_logged(item, FetchStatus::Ready).await;

        let deadline = Instant::now() + stall;
        self.gate.pause_until(deadline);
        tokio::time::sleep_until(deadline).await;

        stall
    }
}
