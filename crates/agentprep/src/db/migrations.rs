//! Ordered schema steps recorded in `_migrations`.

use rusqlite::{params, Connection};

use super::error::DatabaseError;

struct Step {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[Step] = &[
    Step {
        version: 1,
        name: "create_kv_store",
        sql: "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
    },
    Step {
        version: 2,
        name: "add_kv_store_revision",
        sql: "ALTER TABLE kv_store ADD COLUMN revision INTEGER NOT NULL DEFAULT 0;",
    },
];

/// Applies every step newer than the recorded version, each in its own
/// transaction.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let applied = current_version(conn)?;

    for step in STEPS.iter().filter(|s| s.version > applied) {
        log::info!("Applying schema v{} ({})", step.version, step.name);
        let fail = |source| DatabaseError::Migration {
            version: step.version,
            name: step.name,
            source,
        };

        let tx = conn.unchecked_transaction().map_err(fail)?;
        tx.execute_batch(step.sql).map_err(fail)?;
        tx.execute(
            "INSERT INTO _migrations (version, name) VALUES (?1, ?2)",
            params![step.version, step.name],
        )
        .map_err(fail)?;
        tx.commit().map_err(fail)?;
    }

    Ok(())
}

/// Highest applied schema version.
fn current_version(conn: &Connection) -> Result<u32, DatabaseError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |row| row.get(0),
    )?)
}
