//! Error types for gamevis

use thiserror::Error;

use crate::EntityKind;

/// Core gamevis errors
#[derive(Error, Debug)]
pub enum VisError {
    // Registry errors
    #[error("Unknown {kind}: {id}")]
    UnknownEntity { kind: EntityKind, id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Wire errors
    #[error("Invalid wire format: {0}")]
    InvalidWireFormat(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Missing point field: {0}")]
    MissingField(String),

    // Point cloud file errors
    #[error("Malformed PCD: {0}")]
    Pcd(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VisError {
    pub fn unknown(kind: EntityKind, id: impl Into<String>) -> Self {
        VisError::UnknownEntity {
            kind,
            id: id.into(),
        }
    }

    /// True for lookups of an id that is not registered
    pub fn is_unknown_entity(&self) -> bool {
        matches!(self, VisError::UnknownEntity { .. })
    }
}

/// Result type for gamevis operations
pub type VisResult<T> = Result<T, VisError>;
