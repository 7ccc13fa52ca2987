//! Database initialization
//!
//! Opens (creating if needed) the SQLite file backing the document store and
//! creates the `documents` table idempotently.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Busy timeout applied to every connection
pub const BUSY_TIMEOUT_MS: i64 = 5000;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets catalog readers proceed while an admin write is in flight
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    let pragma_sql = format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS);
    sqlx::query(&pragma_sql).execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the same schema (tests, ephemeral runs)
///
/// Limited to one connection: every `:memory:` connection is a separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create the generic document collection table
///
/// One row per record. `sort_key` is only populated for collections with a
/// declared ordering; `created_seq` preserves insertion order for the rest.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            sort_key INTEGER,
            body TEXT NOT NULL,
            created_seq INTEGER NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (collection, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_order ON documents(collection, sort_key, created_seq)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
