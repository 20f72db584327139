//! Error types for the character store.

use klash_mechanics::MechError;
use thiserror::Error;

use crate::record::CharacterId;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store operations. None of them are retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another character already uses this name (case-insensitive).
    #[error("a character named '{0}' already exists")]
    DuplicateName(String),

    /// No character exists under this key.
    #[error("character {0} not found")]
    NotFound(CharacterId),

    /// The requested change breaks a sheet rule.
    #[error("{0}")]
    Validation(#[from] MechError),

    /// The persistence backend failed.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// Stored or imported data could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
