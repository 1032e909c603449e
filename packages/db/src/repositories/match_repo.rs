//! Saved match details.

use queue_core::MatchPayload;
use serde::Deserialize;

use crate::{Database, DbError};

/// Repository for saved match documents.
#[derive(Clone)]
pub struct MatchRepository {
    db: Database,
}

impl MatchRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Save a match document, replacing any earlier copy.
    pub async fn save(&self, payload: &MatchPayload) -> Result<(), DbError> {
        self.db
            .query(
                r#"
                UPSERT type::thing('match_detail', $match_id) CONTENT {
                    match_id: $match_id,
                    payload: $payload,
                    saved_at: time::now()
                } RETURN NONE
                "#,
            )
            .bind(("match_id", payload.match_id.clone()))
            .bind(("payload", payload.body.clone()))
            .await?
            .check()?;

        tracing::debug!("Saved match {}", payload.match_id);
        Ok(())
    }

    /// Return the subset of `match_ids` that is already saved, in one query.
    pub async fn existing_ids(&self, match_ids: &[String]) -> Result<Vec<String>, DbError> {
        if match_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query("SELECT VALUE match_id FROM match_detail WHERE match_id IN $match_ids")
            .bind(("match_ids", match_ids.to_vec()))
            .await?;

        let ids: Vec<String> = result.take(0)?;
        Ok(ids)
    }

    /// Check if a match is saved.
    pub async fn exists(&self, match_id: &str) -> Result<bool, DbError> {
        Ok(!self.existing_ids(&[match_id.to_string()]).await?.is_empty())
    }

    /// Count saved matches.
    pub async fn count(&self) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query("SELECT count() FROM match_detail GROUP ALL")
            .await?;

        #[derive(Deserialize)]
        struct CountResult {
            count: i64,
        }

        let counts: Vec<CountResult> = result.take(0)?;
        Ok(counts.first().map_or(0, |c| c.count.max(0) as u64))
    }
}
