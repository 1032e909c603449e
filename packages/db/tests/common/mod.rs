use db::{Database, DbConfig, DbError};

/// Open a fresh in-memory database with the schema applied.
pub async fn setup_db() -> Result<Database, DbError> {
    db::open(&DbConfig::memory()).await
}
