//! SurrealDB integration for the match crawler.
//!
//! This crate provides database connectivity and repositories for the fetch
//! queue, saved match details and standing history.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod schema;
pub mod repositories;

pub use connection::{Database, DbConfig, DbError, connect, init_db};
pub use schema::init_schema;

/// Initialize the process-wide database with the given configuration.
///
/// This should be called once at application startup.
pub async fn init(config: DbConfig) -> Result<&'static Database, DbError> {
    let db = init_db(config).await?;
    init_schema(db).await?;
    Ok(db)
}

/// Open a standalone database with the schema applied.
pub async fn open(config: &DbConfig) -> Result<Database, DbError> {
    let db = connect(config).await?;
    init_schema(&db).await?;
    Ok(db)
}
