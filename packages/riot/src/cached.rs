//! Caching decorator for any `RiotApi`.

use std::time::Duration;

use futures_util::future::BoxFuture;
use queue_core::{ApiError, MatchPayload, PlayerKey, RiotApi, Standing};

use crate::TtlCache;

/// Wraps a `RiotApi` and caches successful account resolutions.
///
/// Only resolved keys are cached; a miss is asked again next time. The other
/// calls pass straight through.
pub struct CachedRiotApi<A> {
    inner: A,
    accounts: TtlCache<String, PlayerKey>,
}

impl<A: RiotApi> CachedRiotApi<A> {
    pub fn new(inner: A, ttl: Duration, capacity: usize) -> Self {
        Self {
            inner,
            accounts: TtlCache::new(ttl, capacity),
        }
    }

    pub fn cached_accounts(&self) -> usize {
        self.accounts.len()
    }
}

impl<A: RiotApi> RiotApi for CachedRiotApi<A> {
    fn resolve_account<'a>(
        &'a self,
        account_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<PlayerKey>, ApiError>> {
        Box::pin(async move {
            let key = account_id.to_string();
            if let Some(player) = self.accounts.get(&key) {
                tracing::debug!("Account cache hit: {}", account_id);
                return Ok(Some(player));
            }

            let resolved = self.inner.resolve_account(account_id).await?;
            if let Some(player) = &resolved {
                self.accounts.insert(key, player.clone());
            }
            Ok(resolved)
        })
    }

    fn list_match_ids<'a>(
        &'a self,
        player: &'a PlayerKey,
        offset: u32,
        limit: u32,
        since_epoch_secs: i64,
    ) -> BoxFuture<'a, Result<Vec<String>, ApiError>> {
        self.inner.list_match_ids(player, offset, limit, since_epoch_secs)
    }

    fn fetch_match_detail<'a>(
        &'a self,
        match_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MatchPayload>, ApiError>> {
        self.inner.fetch_match_detail(match_id)
    }

    fn fetch_standing<'a>(
        &'a self,
        player: &'a PlayerKey,
    ) -> BoxFuture<'a, Result<Option<Standing>, ApiError>> {
        self.inner.fetch_standing(player)
    }
}
