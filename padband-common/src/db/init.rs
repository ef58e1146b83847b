//! Database initialization
//!
//! Creates the database automatically on first run and opens it thereafter.
//! A recording row is written in a single INSERT, so per-record atomicity
//! comes directly from SQLite; no partial-write state is ever observable.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_recordings_table(&pool).await?;

    Ok(pool)
}

/// Create the recordings table
///
/// `actions` and `instruments` are JSON TEXT columns; a recording is small
/// (a few hundred presses at most) so structured child tables buy nothing.
async fn create_recordings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recordings (
            guid TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL DEFAULT 'Untitled',
            created_at TEXT NOT NULL,
            actions TEXT NOT NULL,
            instruments TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
