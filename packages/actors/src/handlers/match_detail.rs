use queue_core::{FetchItem, FetchKind};

use crate::CrawlerContext;
use crate::error::FetchError;
use crate::handler::{FetchHandler, HandlerFuture};

/// Handles `MATCH` items: fetch the detail and save it.
pub struct MatchHandler {
    ctx: CrawlerContext,
}

impl MatchHandler {
    pub fn new(ctx: CrawlerContext) -> Self {
        Self { ctx }
    }

    async fn fetch(&self, item: &FetchItem) -> Result<(), FetchError> {
        tracing::debug!("Fetching detail for match {}", item.external_id);

        match self.ctx.api.fetch_match_detail(&item.external_id).await? {
            Some(payload) => {
                self.ctx.matches.save(&payload).await?;
                tracing::info!("Saved match {}", payload.match_id);
            }
            // Gone upstream; nothing to retry.
            None => tracing::info!("Match {} not found", item.external_id),
        }

        Ok(())
    }
}

impl FetchHandler for MatchHandler {
    fn kind(&self) -> FetchKind {
        FetchKind::Match
    }

    fn handle<'a>(&'a self, item: &'a FetchItem) -> HandlerFuture<'a> {
        Box::pin(self.fetch(item))
    }
}
