//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// This creates all necessary tables, fields, and indexes.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    // Fetch queue table
    db.query(FETCH_ITEM_SCHEMA).await?.check()?;

    // Saved match details
    db.query(MATCH_DETAIL_SCHEMA).await?.check()?;

    // Standing history
    db.query(STANDING_HISTORY_SCHEMA).await?.check()?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Fetch queue table schema. Record keys are the item's ULID, mirrored in `seq`.
const FETCH_ITEM_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS fetch_item SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS seq ON fetch_item TYPE string;
DEFINE FIELD IF NOT EXISTS external_id ON fetch_item TYPE string;
DEFINE FIELD IF NOT EXISTS kind ON fetch_item TYPE string
    ASSERT $value IN ["IDENTITY_ID", "IDENTITY", "MATCH"];
DEFINE FIELD IF NOT EXISTS status ON fetch_item TYPE string DEFAULT "READY"
    ASSERT $value IN ["READY", "FETCHING", "DONE", "FAIL"];
DEFINE FIELD IF NOT EXISTS priority ON fetch_item TYPE int DEFAULT 0;
DEFINE FIELD IF NOT EXISTS updated_at ON fetch_item TYPE datetime DEFAULT time::now();

-- Claim order: highest priority first, oldest seq on ties
DEFINE INDEX IF NOT EXISTS fetch_item_status_priority ON fetch_item FIELDS status, priority;
DEFINE INDEX IF NOT EXISTS fetch_item_seq ON fetch_item FIELDS seq UNIQUE;
-- Dedup lookups; deliberately not unique
DEFINE INDEX IF NOT EXISTS fetch_item_external ON fetch_item FIELDS external_id, kind;
"#;

/// Match detail table. The payload document is stored as-is.
const MATCH_DETAIL_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS match_detail SCHEMALESS;

DEFINE FIELD IF NOT EXISTS match_id ON match_detail TYPE string;
DEFINE FIELD IF NOT EXISTS saved_at ON match_detail TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS match_detail_id ON match_detail FIELDS match_id UNIQUE;
"#;

/// Standing history: one row per observed change of tier or league points.
const STANDING_HISTORY_SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS standing_history SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS player_key ON standing_history TYPE string;
DEFINE FIELD IF NOT EXISTS tier ON standing_history TYPE string;
DEFINE FIELD IF NOT EXISTS sub_tier ON standing_history TYPE string;
DEFINE FIELD IF NOT EXISTS league_points ON standing_history TYPE int;
DEFINE FIELD IF NOT EXISTS wins ON standing_history TYPE int DEFAULT 0;
DEFINE FIELD IF NOT EXISTS losses ON standing_history TYPE int DEFAULT 0;
DEFINE FIELD IF NOT EXISTS created_at ON standing_history TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS standing_player ON standing_history FIELDS player_key;
DEFINE INDEX IF NOT EXISTS standing_created ON standing_history FIELDS created_at;
"#;
