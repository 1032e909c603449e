//! Periodic re-check of recently active players' standings.

use std::sync::Arc;

use chrono::Utc;
use queue_core::RiotApi;
use serde::Serialize;

use tokio::time::Instant;

use crate::backoff::stall_for;
use crate::error::FetchError;
use crate::gate::CrawlGate;
use crate::sinks::StandingSink;
use crate::CrawlerContext;

/// What one refresh pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub active: usize,
    pub recorded: usize,
    pub unchanged: usize,
    /// Players the API returned no ranked entry for.
    pub unranked: usize,
    pub failed: usize,
    /// The pass stopped early on a rate limit.
    pub rate_limited: bool,
}

pub struct StandingRefresher {
    api: Arc<dyn RiotApi>,
    standings: Arc<dyn StandingSink>,
    window: chrono::Duration,
    gate: CrawlGate,
    default_retry_after_secs: u64,
    pad_secs: u64,
}

impl StandingRefresher {
    pub fn new(ctx: &CrawlerContext) -> Self {
        Self {
            api: ctx.api.clone(),
            standings: ctx.standings.clone(),
            window: ctx.config.standing_active_window,
            gate: ctx.gate.clone(),
            default_retry_after_secs: ctx.config.default_retry_after_secs,
            pad_secs: ctx.config.backoff_pad_secs,
        }
    }

    /// Refresh every player with a standing recorded inside the window.
    ///
    /// Every API call waits out a crawl-wide pause first. A per-player
    /// failure is logged and skipped. A rate limit ends the pass and pauses
    /// the whole crawl like a fetch stall does; the remaining players are
    /// picked up next time.
    pub async fn refresh(&self) -> Result<RefreshReport, FetchError> {
        let active = self.standings.active_since(Utc::now() - self.window).await?;
        tracing::info!("Found {} active players to refresh", active.len());

        let mut report = RefreshReport {
            active: active.len(),
            ..Default::default()
        };

        for player in &active {
            let standing = match self.api.fetch_standing(player).await {
                Ok(Some(standing)) => standing,
                Ok(None) => {
                    report.unranked += 1;
                    continue;
                }
                Err(e) if e.retry_after().is_some() => {
                    let stall = stall_for(e.retry_after().flatten(), self.default_retry_after_secs, self.pad_secs);
                    tracing::warn!(
                        "Rate limited while refreshing standings; stopping pass and pausing {}s",
                        stall.as_secs()
                    );
                    self.gate.pause_until(Instant::now() + stall);
                    report.rate_limited = true;
                    break;
                }
                Err(e) => {
                    tracing::error!("Error refreshing standing for {}: {}", player, e);
                    report.failed += 1;
                    continue;
                }
            };

            match self.standings.upsert_if_changed(player, &standing).await {
                Ok(true) => report.recorded += 1,
                Ok(false) => report.unchanged += 1,
                Err(e) => {
                    tracing::error!("Error recording standing for {}: {}", player, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Standing refresh finished: {} recorded, {} unchanged, {} failed",
            report.recorded,
            report.unchanged,
            report.failed
        );
        Ok(report)
    }
}
