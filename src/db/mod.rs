//! Database module for SQLite persistence.
//!
//! SQLite is the engine underneath, but the rest of the application only
//! sees the key-value record store contract: keyed get, full-collection
//! scan, upsert, delete. No cross-collection transactions.

mod store;

pub use store::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
///
/// One table per record collection. Every table has the same shape: the
/// record's own key plus its JSON body. Filtering beyond a full scan is a
/// presentation-layer concern and deliberately unsupported here.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for table in ["grievances", "session", "accounts", "announcements"] {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL
            );
            "#,
            table
        ))
        .execute(pool)
        .await?;
    }

    Ok(())
}
