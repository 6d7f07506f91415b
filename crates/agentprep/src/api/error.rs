//! API error types and their fallback classification.

use std::fmt;

use thiserror::Error;

use crate::sanitize::truncate_body;
use crate::store::StoreError;

/// Coarse category of an [`ApiError`], used to decide on fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection refused, DNS failure, timeout.
    Network,
    NotFound,
    /// A 4xx other than not-found and validation.
    Rejected,
    ServerFailure,
    /// The body could not be read as the expected JSON shape.
    MalformedResponse,
    Validation,
    /// The local store failed to load or persist.
    Storage,
}

impl ErrorKind {
    /// Whether a failure of this kind on the remote path should be retried
    /// against the local store.
    pub fn triggers_fallback(self) -> bool {
        !matches!(self, ErrorKind::Validation | ErrorKind::Storage)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Rejected => "rejected",
            ErrorKind::ServerFailure => "server_failure",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Validation => "validation",
            ErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    ServerFailure { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Local store error: {0}")]
    Store(#[source] StoreError),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Rejected { .. } => ErrorKind::Rejected,
            ApiError::ServerFailure { .. } => ErrorKind::ServerFailure,
            ApiError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Store(_) => ErrorKind::Storage,
        }
    }

    pub fn triggers_fallback(&self) -> bool {
        self.kind().triggers_fallback()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StoreError::InvalidPatch { .. }
            | StoreError::InvalidReference { .. }
            | StoreError::InvalidPack(_) => ApiError::Validation(err.to_string()),
            other => ApiError::Store(other),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // Drop the URL; it may carry credentials.
        let err = err.without_url();
        if err.is_decode() {
            ApiError::MalformedResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Maps a non-success HTTP status to an error.
///
/// The message is the body's `error` or `message` field when the body is a
/// JSON object, otherwise a truncated excerpt of the raw body.
pub fn classify_status(status: u16, body: &str) -> ApiError {
    let message = error_message(body);
    match status {
        404 => ApiError::NotFound(message),
        400 | 422 => ApiError::Validation(message),
        400..=499 => ApiError::Rejected { status, message },
        _ => ApiError::ServerFailure { status, message },
    }
}

fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let field = parsed.as_ref().and_then(|value| {
        ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
    });
    match field {
        Some(text) => truncate_body(text),
        None => truncate_body(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, PatchError, ReferenceError};

    #[test]
    fn test_status_classification() {
        let cases = [
            (404, ErrorKind::NotFound),
            (400, ErrorKind::Validation),
            (422, ErrorKind::Validation),
            (401, ErrorKind::Rejected),
            (409, ErrorKind::Rejected),
            (500, ErrorKind::ServerFailure),
            (503, ErrorKind::ServerFailure),
        ];
        for (status, expected) in cases {
            assert_eq!(classify_status(status, "").kind(), expected, "status {status}");
        }
    }

    #[test]
    fn test_fallback_classification() {
        assert!(ErrorKind::Network.triggers_fallback());
        assert!(ErrorKind::NotFound.triggers_fallback());
        assert!(ErrorKind::Rejected.triggers_fallback());
        assert!(ErrorKind::ServerFailure.triggers_fallback());
        assert!(ErrorKind::MalformedResponse.triggers_fallback());
        assert!(!ErrorKind::Validation.triggers_fallback());
        assert!(!ErrorKind::Storage.triggers_fallback());
    }

    #[test]
    fn test_message_prefers_json_error_field() {
        let err = classify_status(422, r#"{"error":"name is required"}"#);
        assert_eq!(err.to_string(), "Validation failed: name is required");

        let err = classify_status(502, "<html>Bad gateway</html>");
        assert!(err.to_string().contains("<html>Bad gateway</html>"));
    }

    #[test]
    fn test_store_errors_map_to_kinds() {
        let not_found: ApiError = StoreError::not_found(EntityKind::Role, "r1").into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let invalid: ApiError = StoreError::InvalidPatch {
            kind: EntityKind::Role,
            source: PatchError::NotAnObject("a string"),
        }
        .into();
        assert_eq!(invalid.kind(), ErrorKind::Validation);

        let cycle: ApiError = StoreError::from_reference(
            EntityKind::ProcessStep,
            ReferenceError::Cycle {
                id: "s1".into(),
                parent_id: "s2".into(),
            },
        )
        .into();
        assert_eq!(cycle.kind(), ErrorKind::Validation);
        assert!(!cycle.triggers_fallback());

        let pack: ApiError = StoreError::InvalidPack(ReferenceError::Missing {
            kind: EntityKind::Application,
            id: "a1".into(),
        })
        .into();
        assert_eq!(pack.kind(), ErrorKind::Validation);

        let storage: ApiError = StoreError::Unavailable("disk full".into()).into();
        assert_eq!(storage.kind(), ErrorKind::Storage);
        assert!(!storage.triggers_fallback());
    }
}
