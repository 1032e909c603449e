//! Standing history repository.

use chrono::{DateTime, Utc};
use queue_core::{PlayerKey, Standing};
use serde::Deserialize;
use surrealdb::sql::Datetime;

use crate::{Database, DbError};

/// Repository for recorded standings, one row per observed change.
#[derive(Clone)]
pub struct StandingRepository {
    db: Database,
}

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
struct StandingRecord {
    tier: String,
    sub_tier: String,
    league_points: i32,
    wins: u32,
    losses: u32,
}

impl StandingRecord {
    fn into_standing(self) -> Standing {
        Standing {
            tier: self.tier,
            rank: self.sub_tier,
            league_points: self.league_points,
            wins: self.wins,
            losses: self.losses,
        }
    }
}

impl StandingRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the most recent standing recorded for a player.
    pub async fn latest(&self, player: &PlayerKey) -> Result<Option<Standing>, DbError> {
        let mut result = self
            .db
            .query(
                r#"
                SELECT * FROM standing_history
                WHERE player_key = $player_key
                ORDER BY created_at DESC
                LIMIT 1
                "#,
            )
            .bind(("player_key", player.0.clone()))
            .await?;

        let records: Vec<StandingRecord> = result.take(0)?;
        Ok(records.into_iter().next().map(StandingRecord::into_standing))
    }

    /// Append a standing row for a player.
    pub async fn record(&self, player: &PlayerKey, standing: &Standing) -> Result<(), DbError> {
        self.db
            .query(
                r#"
                CREATE standing_history SET
                    player_key = $player_key,
                    tier = $tier,
                    sub_tier = $sub_tier,
                    league_points = $league_points,
                    wins = $wins,
                    losses = $losses,
                    created_at = time::now()
                RETURN NONE
                "#,
            )
            .bind(("player_key", player.0.clone()))
            .bind(("tier", standing.tier.clone()))
            .bind(("sub_tier", standing.rank.clone()))
            .bind(("league_points", standing.league_points))
            .bind(("wins", standing.wins))
            .bind(("losses", standing.losses))
            .await?
            .check()?;

        Ok(())
    }

    /// Record `standing` unless it matches the latest row on tier and league
    /// points. A player's first standing is always recorded.
    ///
    /// Returns whether a row was written.
    pub async fn upsert_if_changed(&self, player: &PlayerKey, standing: &Standing) -> Result<bool, DbError> {
        let latest = self.latest(player).await?;
        if !standing.differs_from(latest.as_ref()) {
            return Ok(false);
        }

        self.record(player, standing).await?;
        tracing::info!(
            "Recorded standing for {}: {} {} {}LP",
            player,
            standing.tier,
            standing.rank,
            standing.league_points
        );
        Ok(true)
    }

    /// List every player with a standing recorded after `cutoff`.
    pub async fn active_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<PlayerKey>, DbError> {
        let mut result = self
            .db
            .query(
                r#"
                SELECT player_key FROM standing_history
                WHERE created_at > $cutoff
                GROUP BY player_key
                "#,
            )
            .bind(("cutoff", Datetime::from(cutoff)))
            .await?;

        #[derive(Deserialize)]
        struct KeyRow {
            player_key: String,
        }

        let rows: Vec<KeyRow> = result.take(0)?;
        Ok(rows.into_iter().map(|r| PlayerKey(r.player_key)).collect())
    }

    /// Full history for a player, oldest first.
    pub async fn history(&self, player: &PlayerKey) -> Result<Vec<Standing>, DbError> {
        let mut result = self
            .db
            .query("SELECT * FROM standing_history WHERE player_key = $player_key ORDER BY created_at ASC")
            .bind(("player_key", player.0.clone()))
            .await?;

        let records: Vec<StandingRecord> = result.take(0)?;
        Ok(records.into_iter().map(StandingRecord::into_standing).collect())
    }
}
