//! Key-value record store over independent collections.

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;

/// Fixed key of the singleton current-session record.
pub const CURRENT_SESSION_KEY: &str = "current_session";

/// The four independent record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Grievance records, keyed by id
    Grievances,
    /// The singleton current-session record
    Session,
    /// Global account registry, keyed by lowercase email
    Accounts,
    /// Announcement records, keyed by id
    Announcements,
}

impl Collection {
    fn table(&self) -> &'static str {
        match self {
            Collection::Grievances => "grievances",
            Collection::Session => "session",
            Collection::Accounts => "accounts",
            Collection::Announcements => "announcements",
        }
    }
}

/// Persistence service for all record collections.
///
/// Failures surface as `AppError::Database` and are never retried; callers
/// see the error with no partial mutation committed.
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a record by key.
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<T>, AppError> {
        let sql = format!("SELECT body FROM {} WHERE key = ?", collection.table());
        let row = sqlx::query(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let body: String = row.get("body");
                Ok(Some(serde_json::from_str(&body)?))
            }
            None => Ok(None),
        }
    }

    /// Scan a full collection.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, AppError> {
        let sql = format!("SELECT body FROM {}", collection.table());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let body: String = row.get("body");
            records.push(serde_json::from_str(&body)?);
        }
        Ok(records)
    }

    /// Upsert a record under its key.
    pub async fn put<T: Serialize>(
        &self,
        collection: Collection,
        key: &str,
        record: &T,
    ) -> Result<(), AppError> {
        let body = serde_json::to_string(record)?;
        let sql = format!(
            "INSERT INTO {} (key, body) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET body = excluded.body",
            collection.table()
        );
        sqlx::query(&sql)
            .bind(key)
            .bind(&body)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a record by key. Returns whether a record existed.
    pub async fn delete(&self, collection: Collection, key: &str) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE key = ?", collection.table());
        let result = sqlx::query(&sql).bind(key).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
