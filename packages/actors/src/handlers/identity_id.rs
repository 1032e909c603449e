//! Resolves account ids to player keys.

use queue_core::{FetchItem, FetchKind};

use crate::CrawlerContext;
use crate::error::FetchError;
use crate::handler::{FetchHandler, HandlerFuture};

/// Handles `IDENTITY_ID` items.
///
/// A resolved key gets an `IDENTITY` item at the source item's priority
/// unless one exists. The key's current standing is recorded on the way, so
/// players found this way show up in rankings before their first refresh.
pub struct IdentityIdHandler {
    ctx: CrawlerContext,
}

impl IdentityIdHandler {
    pub fn new(ctx: CrawlerContext) -> Self {
        Self { ctx }
    }

    async fn resolve(&self, item: &FetchItem) -> Result<(), FetchError> {
        tracing::info!("Resolving account {} to player key", item.external_id);

        let Some(player) = self.ctx.api.resolve_account(&item.external_id).await? else {
            tracing::info!("Account {} did not resolve", item.external_id);
            return Ok(());
        };

        let (queued, standing) = tokio::join!(
            self.ctx.queue.exists_with_kind(player.as_str(), FetchKind::Identity),
            self.ctx.api.fetch_standing(&player),
        );

        if !queued? {
            let next = FetchItem::new(player.as_str(), FetchKind::Identity, item.priority);
            self.ctx.queue.enqueue(&next).await?;
            tracing::info!("Queued player {} at priority {}", player, item.priority);
        }

        match standing {
            Ok(Some(standing)) => {
                if let Err(e) = self.ctx.standings.upsert_if_changed(&player, &standing).await {
                    tracing::warn!("Failed to record standing for {}: {}", player, e);
                }
            }
            Ok(None) => tracing::debug!("Player {} has no ranked standing", player),
            // The item goes back to READY; the IDENTITY item above is not duplicated on retry.
            Err(e) if e.retry_after().is_some() => return Err(e.into()),
            Err(e) => tracing::warn!("Failed to fetch standing for {}: {}", player, e),
        }

        Ok(())
    }
}

impl FetchHandler for IdentityIdHandler {
    fn kind(&self) -> FetchKind {
        FetchKind::IdentityId
    }

    fn handle<'a>(&'a self, item: &'a FetchItem) -> HandlerFuture<'a> {
        Box::pin(self.resolve(item))
    }
}
