//! Persistence collaborators the handlers write through.

use chrono::{DateTime, Utc};
use db::DbError;
use db::repositories::{MatchRepository, StandingRepository};
use futures_util::future::BoxFuture;
use queue_core::{MatchPayload, PlayerKey, Standing};

/// Where fetched match details go.
pub trait MatchSink: Send + Sync {
    fn save<'a>(&'a self, payload: &'a MatchPayload) -> BoxFuture<'a, Result<(), DbError>>;

    /// Return the subset of `match_ids` already saved.
    fn existing_ids<'a>(&'a self, match_ids: &'a [String]) -> BoxFuture<'a, Result<Vec<String>, DbError>>;
}

/// Where observed standings go.
pub trait StandingSink: Send + Sync {
    /// Record `standing` unless tier and league points match the latest
    /// record. Returns whether a row was written.
    fn upsert_if_changed<'a>(
        &'a self,
        player: &'a PlayerKey,
        standing: &'a Standing,
    ) -> BoxFuture<'a, Result<bool, DbError>>;

    /// Players with a standing recorded after `cutoff`.
    fn active_since(&self, cutoff: DateTime<Utc>) -> BoxFuture<'_, Result<Vec<PlayerKey>, DbError>>;
}

impl MatchSink for MatchRepository {
    fn save<'a>(&'a self, payload: &'a MatchPayload) -> BoxFuture<'a, Result<(), DbError>> {
        Box::pin(MatchRepository::save(self, payload))
    }

    fn existing_ids<'a>(&'a self, match_ids: &'a [String]) -> BoxFuture<'a, Result<Vec<String>, DbError>> {
        Box::pin(MatchRepository::existing_ids(self, match_ids))
    }
}

impl StandingSink for StandingRepository {
    fn upsert_if_changed<'a>(
        &'a self,
        player: &'a PlayerKey,
        standing: &'a Standing,
    ) -> BoxFuture<'a, Result<bool, DbError>> {
        Box::pin(StandingRepository::upsert_if_changed(self, player, standing))
    }

    fn active_since(&self, cutoff: DateTime<Utc>) -> BoxFuture<'_, Result<Vec<PlayerKey>, DbError>> {
        Box::pin(StandingRepository::active_since(self, cutoff))
    }
}
