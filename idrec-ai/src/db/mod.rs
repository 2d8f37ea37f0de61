//! Database access for idrec-ai
//!
//! SQLite record store for confirmed identity cards.

pub mod identity_cards;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Opens (or creates) the database file and ensures the schema exists.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create tables if they don't exist (idempotent)
pub async fn init_tables(pool: &SqlitePool) -> idrec_common::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS identity_cards (
            guid TEXT PRIMARY KEY,
            issuing_country TEXT,
            authority TEXT,
            card_type TEXT,
            full_name TEXT,
            surname TEXT,
            sex TEXT,
            date_of_birth TEXT,
            age INTEGER,
            nationality TEXT,
            id_number TEXT,
            issuing_date TEXT,
            expiry_date TEXT,
            signature_present INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_identity_cards_created_at ON identity_cards(created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
