//! The fetch orchestrator, run once per scheduler tick.

use std::time::Instant;

use chrono::Utc;
use queue_core::{FetchEvent, FetchItem, FetchStatus};
use serde::Serialize;

use crate::backoff::BackoffController;
use crate::error::FetchError;
use crate::handler::HandlerSet;
use crate::status::StatusUpdater;
use crate::CrawlerContext;

/// What one tick did.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Whether a READY item was claimed. Without a claim nothing else runs.
    pub claimed: bool,
    pub completed: usize,
    pub failed: usize,
    pub requeued: usize,
}

impl TickReport {
    pub fn processed(&self) -> usize {
        self.completed + self.failed + self.requeued
    }
}

enum Outcome {
    Completed,
    Failed,
    Requeued,
}

pub struct FetchService {
    ctx: CrawlerContext,
    handlers: HandlerSet,
    status: StatusUpdater,
    backoff: BackoffController,
}

impl FetchService {
    /// Create a service running the standard handlers.
    pub fn new(ctx: CrawlerContext) -> Self {
        let handlers = HandlerSet::standard(&ctx);
        Self::with_handlers(ctx, handlers)
    }

    pub fn with_handlers(ctx: CrawlerContext, handlers: HandlerSet) -> Self {
        let status = StatusUpdater::new(ctx.queue.clone());
        let backoff = BackoffController::new(
            status.clone(),
            ctx.gate.clone(),
            ctx.config.default_retry_after_secs,
            ctx.config.backoff_pad_secs,
        );
        Self {
            ctx,
            handlers,
            status,
            backoff,
        }
    }

    pub fn backoff(&self) -> &BackoffController {
        &self.backoff
    }

    /// Claim one item and, if that worked, process every in-flight item.
    ///
    /// Items stranded in FETCHING by an earlier run are picked up along with
    /// the new claim. Items are handled one at a time; a failing item never
    /// stops the rest of the batch.
    pub async fn fetch_next(&self) -> Result<TickReport, FetchError> {
        let mut report = TickReport::default();

        let Some(claimed) = self.ctx.queue.claim_next_item().await? else {
            return Ok(report);
        };
        report.claimed = true;
        tracing::debug!(
            "Claimed item {} ({} {}, priority {})",
            claimed.id,
            claimed.kind,
            claimed.external_id,
            claimed.priority
        );
        self.ctx.emit(FetchEvent::ItemClaimed {
            item_id: claimed.id,
            external_id: claimed.external_id.clone(),
            kind: claimed.kind,
            timestamp: Utc::now(),
        });

        let in_flight = self.ctx.queue.list_in_flight().await?;
        if in_flight.len() > 1 {
            tracing::info!("Processing {} in-flight items", in_flight.len());
        }

        for item in &in_flight {
            match self.process(item).await {
                Outcome::Completed => report.completed += 1,
                Outcome::Failed => report.failed += 1,
                Outcome::Requeued => report.requeued += 1,
            }
        }

        Ok(report)
    }

    async fn process(&self, item: &FetchItem) -> Outcome {
        let started = Instant::now();

        let error = match self.handlers.get(item.kind).handle(item).await {
            Ok(()) => {
                self.status.set_status_logged(item, FetchStatus::Done).await;
                self.ctx.emit(FetchEvent::ItemCompleted {
                    item_id: item.id,
                    kind: item.kind,
                    duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    timestamp: Utc::now(),
                });
                return Outcome::Completed;
            }
            Err(e) => e,
        };

        if let Some(retry_after) = error.retry_after() {
            let stall = self.backoff.back_off(item, retry_after).await;
            self.ctx.emit(FetchEvent::ItemRequeued {
                item_id: item.id,
                stall_secs: stall.as_secs(),
                timestamp: Utc::now(),
            });
            return Outcome::Requeued;
        }

        tracing::error!(
            "Error processing {} item {}: {}",
            item.kind,
            item.external_id,
            error
        );
        self.status.set_status_logged(item, FetchStatus::Fail).await;
        self.ctx.emit(FetchEvent::ItemFailed {
            item_id: item.id,
            kind: item.kind,
            error: error.to_string(),
            timestamp: Utc::now(),
        });
        Outcome::Failed
    }
}
