//! Shallow merge patches over serializable records.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("patch must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("record does not serialize to a JSON object")]
    UnsupportedRecord,

    #[error("cannot serialize record: {0}")]
    Encode(#[source] serde_json::Error),

    /// The merged value no longer fits the record's shape.
    #[error("{0}")]
    Merge(#[source] serde_json::Error),
}

/// Overlays the top-level keys of `patch` onto `current`, skipping
/// `protected` keys, and reads the result back as `T`.
pub fn apply_patch<T>(current: &T, patch: &Value, protected: &[&str]) -> Result<T, PatchError>
where
    T: Serialize + DeserializeOwned,
{
    let Value::Object(changes) = patch else {
        return Err(PatchError::NotAnObject(kind_of(patch)));
    };

    let mut merged = serde_json::to_value(current).map_err(PatchError::Encode)?;
    let Value::Object(fields) = &mut merged else {
        return Err(PatchError::UnsupportedRecord);
    };

    for (key, value) in changes {
        if protected.contains(&key.as_str()) {
            continue;
        }
        fields.insert(key.clone(), value.clone());
    }

    serde_json::from_value(merged).map_err(PatchError::Merge)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
