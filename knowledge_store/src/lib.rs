//! # Knowledge Store
//!
//! The state layer of the Sonho assistant - everything the assistant knows and
//! remembers. This crate holds no dialogue logic; `dialogue_core` drives it.
//!
//! ## Core Components
//!
//! - **facts**: Topic-keyed fact records with exact-text deduplication
//! - **vocabulary**: Inverted index from significant words to the topics using them
//! - **relationships**: Co-occurrence edges between a topic and the words of its facts
//! - **memory**: Bounded conversation history and short-term context
//! - **document**: The persisted aggregate and its legacy-schema migration
//! - **storage**: Whole-document load/save backends
//! - **nlp**: Collaborator interfaces (normalizer, embedder, entity extractor)
//! - **store**: The `KnowledgeStore` facade composing all of the above
//!
//! ## Design Philosophy
//!
//! - **Whole-Document**: Every mutation rewrites the full document, never a partial write
//! - **Never Fatal**: Corrupt storage and failing collaborators degrade instead of erroring
//! - **Normalized Keys**: Topics are lower-cased and trimmed before any map access

mod error;

pub mod document;
pub mod facts;
pub mod memory;
pub mod nlp;
pub mod relationships;
pub mod storage;
pub mod store;
pub mod vocabulary;

pub use document::*;
pub use error::*;
pub use facts::*;
pub use memory::*;
pub use nlp::*;
pub use relationships::*;
pub use storage::*;
pub use store::*;
pub use vocabulary::*;
