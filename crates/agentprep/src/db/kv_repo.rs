//! Key-value repository over the `kv_store` table.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{Database, DatabaseError};

/// Reads the value stored under `key`.
pub fn get(db: &Database, key: &str) -> Result<Option<String>, DatabaseError> {
    db.with_conn(|conn| {
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    })
}

/// Inserts or replaces the value under `key` and returns its new revision.
pub fn put(db: &Database, key: &str, value: &str) -> Result<u64, DatabaseError> {
    let now = Utc::now().to_rfc3339();
    db.with_conn(|conn| {
        let revision: i64 = conn.query_row(
            "INSERT INTO kv_store (key, value, updated_at, revision) VALUES (?1, ?2, ?3, 1)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                revision = kv_store.revision + 1
             RETURNING revision",
            params![key, value, now],
            |row| row.get(0),
        )?;
        Ok(revision.max(0) as u64)
    })
}
