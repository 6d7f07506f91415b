use std::path::PathBuf;

use thiserror::Error;

/// Failures of the SQLite slot that holds the store blob.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot create database directory '{dir}': {source}")]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema step v{version} ({name}) failed: {source}")]
    Migration {
        version: u32,
        name: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A thread panicked while holding the connection.
    #[error("Database connection poisoned")]
    LockPoisoned,
}
