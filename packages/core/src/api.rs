//! Contract of the external Riot API client.

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::{MatchPayload, PlayerKey, Standing};

/// Errors surfaced by the API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The API rejected the call because the key's rate budget is spent.
    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Get the retry delay if this is a rate-limit rejection.
    ///
    /// The outer option tells whether the call was rate limited at all, the
    /// inner one whether the API sent a delay.
    pub fn retry_after(&self) -> Option<Option<u64>> {
        match self {
            ApiError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

/// Rate-limited access to the Riot API.
///
/// "Not found" answers come back as `Ok(None)` / an empty list, never as an
/// error. `ApiError::RateLimited` is the only error callers treat specially.
pub trait RiotApi: Send + Sync {
    /// Resolve an account id to a durable player key.
    fn resolve_account<'a>(
        &'a self,
        account_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<PlayerKey>, ApiError>>;

    /// List one page of match ids played at or after `since_epoch_secs`.
    fn list_match_ids<'a>(
        &'a self,
        player: &'a PlayerKey,
        offset: u32,
        limit: u32,
        since_epoch_secs: i64,
    ) -> BoxFuture<'a, Result<Vec<String>, ApiError>>;

    /// Fetch the full detail of a match.
    fn fetch_match_detail<'a>(
        &'a self,
        match_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<MatchPayload>, ApiError>>;

    /// Fetch the player's current ranked standing.
    fn fetch_standing<'a>(
        &'a self,
        player: &'a PlayerKey,
    ) -> BoxFuture<'a, Result<Option<Standing>, ApiError>>;
}
