//! Error types for the knowledge store.

/// Errors raised while reading or writing the persisted document.
///
/// None of these are fatal to the assistant: loading recovers by
/// reinitializing, and callers of `save` log and carry on.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;
