//! Crawl-wide pause shared by every caller of the Riot API.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use queue_core::{ApiError, MatchPayload, PlayerKey, RiotApi, Standing};
use tokio::sync::watch;
use tokio::time::Instant;

/// Holds the instant until which no API call may start.
///
/// A rate-limit stall on one worker pauses all of them: the stalling side
/// calls `pause_until`, every other caller awaits `wait` before each request.
/// A pause only ever extends; a shorter deadline never cuts one short.
#[derive(Clone)]
pub struct CrawlGate {
    until: Arc<watch::Sender<Option<Instant>>>,
}

impl Default for CrawlGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlGate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { until: Arc::new(tx) }
    }

    /// Block API calls until `deadline`.
    pub fn pause_until(&self, deadline: Instant) {
        self.until.send_if_modified(|until| match until {
            Some(current) if *current >= deadline => false,
            _ => {
                *until = Some(deadline);
                true
            }
        });
    }

    /// The end of the current pause, if one is in effect.
    pub fn paused_until(&self) -> Option<Instant> {
        (*self.until.borrow()).filter(|deadline| *deadline > Instant::now())
    }

    /// Wait out the current pause, including extensions made while waiting.
    pub async fn wait(&self) {
        while let Some(deadline) = self.paused_until() {
            tracing::debug!(
                "Crawl paused; waiting {}ms",
                deadline.saturating_duration_since(Instant::now()).as_millis()
            );
            tokio::time::sleep_until(deadline).await;
        }
    }
}

/// A `RiotApi` whose every call first waits out the gate.
pub(crate) struct GatedApi {
    inner: Arc<dyn RiotApi>,
    gate: CrawlGate,
}

impl GatedApi {
    pub(crate) fn new(inner: Arc<dyn RiotApi>, gate: CrawlGate) -> Self {
        Self { inner, gate }
    }
}

impl RiotApi for GatedApi {
    fn resolve_account<'a>(
        &'a self,
        account_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<PlayerKey>, ApiError>> {
        Box::pin(async move {
            self.gate.wait().await;
            self.inner.resolve_account(account_id).await
        })
    }

    fn list_match_ids<'a>(
        &'a self,
        player: &'a PlayerKey,
        offset: u32,
        limit: u32,
        since_epoch_secs: i64,
    ) -> BoxFuture<'a, Result<Vec<String>, ApiError>> {
        Box::pin(async move {
            self.gate.wait().await;
            self.inner.list_match_ids(player, offset, limit, since_epoch_secs).await
        })
    }

    fn fetch_match_detail<'a>(
        &'a self,
        match_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MatchPayload>, ApiError>> {
        Box::pin(async move {
            self.gate.wait().await;
            self.inner.fetch_match_detail(match_id).await
        })
    }

    fn fetch_standing<'a>(
        &'a self,
        player: &'a PlayerKey,
    ) -> BoxFuture<'a, Result<Option<Standing>, ApiError>> {
        Box::pin(async move {
            self.gate.wait().await;
            self.inner.fetch_standing(player).await
        })
    }
}
