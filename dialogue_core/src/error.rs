//! Error types for dialogue construction.
//!
//! Turn processing itself never fails; these only surface while loading
//! configuration, compiling patterns, or checkpointing.

use knowledge_store::StoreError;

use crate::config::QuestionKind;

#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid question pattern for {kind:?}: {source}")]
    InvalidPattern {
        kind: QuestionKind,
        #[source]
        source: regex::Error,
    },

    #[error("question pattern for {0:?} has no `topic` capture group")]
    MissingTopicGroup(QuestionKind),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

pub type DialogueResult<T> = Result<T, DialogueError>;
