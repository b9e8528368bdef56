//! Error types for the domain layer
//!
//! Two families cover everything the pure layer can reject:
//! - `ValidationError`: user-submitted records, generation payloads and
//!   closed-set labels (terrain, element type, batch size)
//! - `LookupError`: resolving a companion name inside a generated batch

use thiserror::Error;

/// Rejection of input data before it enters the session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The text is not valid JSON, or not the JSON shape expected.
    #[error("Invalid JSON: {0}")]
    MalformedInput(String),

    /// A required field is absent, not a string, or blank after aliasing.
    #[error("Missing required field '{field}' (accepted spellings: {accepted})")]
    MissingRequiredField {
        field: &'static str,
        accepted: &'static str,
    },

    /// The generation payload has no top-level key at all.
    #[error("Generation payload is empty")]
    EmptyPayload,

    /// The generation payload has several top-level keys and none is `pokemon`.
    #[error("Generation payload is ambiguous: expected key 'pokemon' or a single key, found {keys:?}")]
    AmbiguousPayload { keys: Vec<String> },

    /// The resolved payload value is not a list of records.
    #[error("Invalid batch shape: {0}")]
    InvalidBatchShape(String),

    #[error("Unknown terrain: '{0}'")]
    UnknownTerrain(String),

    #[error("Unknown element type: '{0}'")]
    UnknownElementType(String),

    #[error("Batch size must be between {min} and {max}, got {value}")]
    InvalidBatchSize { value: i64, min: u8, max: u8 },
}

impl ValidationError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidBatchShape(msg.into())
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

/// Failure to resolve a companion name against a generated batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("No generated batch in this session")]
    NoBatch,

    #[error("Generated batch has no name column (expected one of: {expected})")]
    NoNameColumn { expected: &'static str },

    #[error("No record named '{0}' in the generated batch")]
    NotFound(String),

    #[error("Name '{name}' matches {count} records in the generated batch")]
    AmbiguousName { name: String, count: usize },
}
