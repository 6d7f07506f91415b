//! Local store error types.

use thiserror::Error;

use crate::db::DatabaseError;
use crate::model::{EntityKind, PatchError, ReferenceError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid patch for {kind}: {source}")]
    InvalidPatch {
        kind: EntityKind,
        #[source]
        source: PatchError,
    },

    /// The change would break the catalog's structure, e.g. a step cycle.
    #[error("Invalid {kind}: {source}")]
    InvalidReference {
        kind: EntityKind,
        #[source]
        source: ReferenceError,
    },

    #[error("Pack cannot be imported: {0}")]
    InvalidPack(#[source] ReferenceError),

    #[error("Storage backend error: {0}")]
    Backend(#[from] DatabaseError),

    /// The persistence medium refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize store: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Stored data under '{key}' is not readable: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Missing targets read as `NotFound`; anything else is a rejected edit.
    pub fn from_reference(kind: EntityKind, err: ReferenceError) -> Self {
        match err {
            ReferenceError::Missing { kind, id } => StoreError::NotFound { kind, id },
            source => StoreError::InvalidReference { kind, source },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
