//! Fetch queue repository: the durable, single source of truth for work items.

use std::collections::HashMap;

use queue_core::{FetchItem, FetchKind, FetchStatus, ItemId};
use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::{Database, DbError};

/// How many times a claim retries after losing a race for its candidate.
const CLAIM_ATTEMPTS: usize = 3;

/// Repository for fetch queue persistence operations.
#[derive(Clone)]
pub struct FetchQueueRepository {
    db: Database,
}

/// Internal record type for SurrealDB.
#[derive(Debug, Serialize, Deserialize)]
struct FetchItemRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    seq: String,
    external_id: String,
    kind: FetchKind,
    status: FetchStatus,
    priority: i32,
    updated_at: Datetime,
}

impl FetchItemRecord {
    fn from_item(item: &FetchItem) -> Self {
        Self {
            id: None,
            seq: item.id.to_string(),
            external_id: item.external_id.clone(),
            kind: item.kind,
            status: item.status,
            priority: item.priority,
            updated_at: Datetime::from(item.updated_at),
        }
    }

    fn into_item(self) -> Result<FetchItem, DbError> {
        let id = ItemId::parse(&self.seq)
            .map_err(|e| DbError::Serialization(format!("Bad item id {}: {}", self.seq, e)))?;
        Ok(FetchItem {
            id,
            external_id: self.external_id,
            kind: self.kind,
            status: self.status,
            priority: self.priority,
            updated_at: self.updated_at.0,
        })
    }
}

fn into_items(records: Vec<FetchItemRecord>) -> Result<Vec<FetchItem>, DbError> {
    records.into_iter().map(FetchItemRecord::into_item).collect()
}

impl FetchQueueRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new item.
    pub async fn enqueue(&self, item: &FetchItem) -> Result<FetchItem, DbError> {
        let record: Option<FetchItemRecord> = self
            .db
            .create(("fetch_item", item.id.to_string()))
            .content(FetchItemRecord::from_item(item))
            .await?;

        record
            .ok_or_else(|| DbError::Query("Failed to enqueue item".into()))?
            .into_item()
    }

    /// Merge a batch of items into the queue in a single transaction.
    ///
    /// Unknown ids are inserted as given. An existing row is only ever moved
    /// forward against its current stored state, never against the snapshot
    /// the batch was planned from:
    /// - a READY item revives a row that is still FAIL, refreshing `updated_at`
    /// - a higher priority raises a row that is not DONE
    ///
    /// Nothing else about an existing row is written, so a row claimed or
    /// finished since the snapshot keeps its status.
    pub async fn bulk_upsert(&self, items: &[FetchItem]) -> Result<(), DbError> {
        if items.is_empty() {
            return Ok(());
        }

        let rows: Vec<FetchItemRecord> = items.iter().map(FetchItemRecord::from_item).collect();

        self.db
            .query(
                r#"
                BEGIN TRANSACTION;
                FOR $row IN $rows {
                    LET $rid = type::thing('fetch_item', $row.seq);
                    IF array::len((SELECT VALUE seq FROM $rid)) == 0 {
                        CREATE $rid SET
                            seq = $row.seq,
                            external_id = $row.external_id,
                            kind = $row.kind,
                            status = $row.status,
                            priority = $row.priority,
                            updated_at = $row.updated_at;
                    } ELSE {
                        IF $row.status == 'READY' {
                            UPDATE $rid SET status = 'READY', updated_at = $row.updated_at
                            WHERE status = 'FAIL';
                        };
                        UPDATE $rid SET priority = $row.priority
                        WHERE status != 'DONE' AND priority < $row.priority;
                    };
                };
                COMMIT TRANSACTION;
                "#,
            )
            .bind(("rows", rows))
            .await?
            .check()?;

        Ok(())
    }

    /// Atomically claim the highest-priority READY item (ties: lowest id).
    ///
    /// Returns the number of items claimed, 0 or 1.
    pub async fn claim_next(&self) -> Result<u64, DbError> {
        Ok(self.claim_next_item().await?.map_or(0, |_| 1))
    }

    /// Atomically claim the highest-priority READY item and return it.
    ///
    /// The flip to FETCHING is a conditional update on the candidate record,
    /// so of several concurrent claimers at most one wins it. A loser moves on
    /// to the next candidate.
    pub async fn claim_next_item(&self) -> Result<Option<FetchItem>, DbError> {
        for _ in 0..CLAIM_ATTEMPTS {
            let Some(candidate) = self.peek_next_ready().await? else {
                return Ok(None);
            };

            let mut result = self
                .db
                .query(
                    r#"
                    UPDATE type::thing('fetch_item', $seq)
                    SET status = 'FETCHING', updated_at = time::now()
                    WHERE status = 'READY'
                    RETURN AFTER
                    "#,
                )
                .bind(("seq", candidate.seq))
                .await?;

            let records: Vec<FetchItemRecord> = result.take(0)?;
            if let Some(record) = records.into_iter().next() {
                return record.into_item().map(Some);
            }
        }

        Ok(None)
    }

    async fn peek_next_ready(&self) -> Result<Option<FetchItemRecord>, DbError> {
        let mut result = self
            .db
            .query(
                r#"
                SELECT * FROM fetch_item
                WHERE status = 'READY'
                ORDER BY priority DESC, seq ASC
                LIMIT 1
                "#,
            )
            .await?;

        let records: Vec<FetchItemRecord> = result.take(0)?;
        Ok(records.into_iter().next())
    }

    /// List every FETCHING item, oldest update first.
    ///
    /// Besides the item claimed this tick, this returns items stranded in
    /// FETCHING by an earlier crash.
    pub async fn list_in_flight(&self) -> Result<Vec<FetchItem>, DbError> {
        let mut result = self
            .db
            .query(
                r#"
                SELECT * FROM fetch_item
                WHERE status = 'FETCHING'
                ORDER BY updated_at ASC, seq ASC
                "#,
            )
            .await?;

        let records: Vec<FetchItemRecord> = result.take(0)?;
        into_items(records)
    }

    /// Get an item by ID.
    pub async fn get(&self, id: ItemId) -> Result<Option<FetchItem>, DbError> {
        let record: Option<FetchItemRecord> =
            self.db.select(("fetch_item", id.to_string())).await?;

        record.map(FetchItemRecord::into_item).transpose()
    }

    /// Check if any item, of any kind, exists for an external id.
    pub async fn exists(&self, external_id: &str) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT count() FROM fetch_item WHERE external_id = $external_id GROUP ALL")
            .bind(("external_id", external_id.to_string()))
            .await?;

        let counts: Vec<CountResult> = result.take(0)?;
        Ok(counts.first().is_some_and(|c| c.count > 0))
    }

    /// Check if an item of the given kind exists for an external id.
    pub async fn exists_with_kind(&self, external_id: &str, kind: FetchKind) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() FROM fetch_item WHERE external_id = $external_id AND kind = $kind GROUP ALL",
            )
            .bind(("external_id", external_id.to_string()))
            .bind(("kind", kind.as_str()))
            .await?;

        let counts: Vec<CountResult> = result.take(0)?;
        Ok(counts.first().is_some_and(|c| c.count > 0))
    }

    /// Find the oldest item for an external id.
    pub async fn find(&self, external_id: &str) -> Result<Option<FetchItem>, DbError> {
        let mut result = self
            .db
            .query("SELECT * FROM fetch_item WHERE external_id = $external_id ORDER BY seq ASC LIMIT 1")
            .bind(("external_id", external_id.to_string()))
            .await?;

        let records: Vec<FetchItemRecord> = result.take(0)?;
        records.into_iter().next().map(FetchItemRecord::into_item).transpose()
    }

    /// Find every item of `kind` whose external id is in `external_ids`, in one query.
    pub async fn find_many(&self, external_ids: &[String], kind: FetchKind) -> Result<Vec<FetchItem>, DbError> {
        if external_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                r#"
                SELECT * FROM fetch_item
                WHERE kind = $kind AND external_id IN $external_ids
                ORDER BY seq ASC
                "#,
            )
            .bind(("kind", kind.as_str()))
            .bind(("external_ids", external_ids.to_vec()))
            .await?;

        let records: Vec<FetchItemRecord> = result.take(0)?;
        into_items(records)
    }

    /// Move an item to `status`, refreshing `updated_at`.
    ///
    /// The write is its own statement and commits immediately. Transitions the
    /// state machine forbids (anything out of DONE) are not applied; `None` is
    /// returned for those and for unknown ids.
    pub async fn set_status(&self, id: ItemId, status: FetchStatus) -> Result<Option<FetchItem>, DbError> {
        let sources: Vec<&'static str> = status.allowed_sources().iter().map(|s| s.as_str()).collect();

        let mut result = self
            .db
            .query(
                r#"
                UPDATE type::thing('fetch_item', $seq)
                SET status = $status, updated_at = time::now()
                WHERE status IN $sources
                RETURN AFTER
                "#,
            )
            .bind(("seq", id.to_string()))
            .bind(("status", status.as_str()))
            .bind(("sources", sources))
            .await?;

        let records: Vec<FetchItemRecord> = result.take(0)?;
        records.into_iter().next().map(FetchItemRecord::into_item).transpose()
    }

    /// Count items by status.
    pub async fn count_by_status(&self) -> Result<HashMap<FetchStatus, u64>, DbError> {
        let mut result = self
            .db
            .query("SELECT status, count() AS count FROM fetch_item GROUP BY status")
            .await?;

        #[derive(Deserialize)]
        struct StatusCount {
            status: FetchStatus,
            count: i64,
        }

        let counts: Vec<StatusCount> = result.take(0)?;

        Ok(counts
            .into_iter()
            .map(|c| (c.status, c.count.max(0) as u64))
            .collect())
    }
}

#[derive(Deserialize)]
struct CountResult {
    count: i64,
}
