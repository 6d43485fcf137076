//! # Dialogue Core
//!
//! The "brain" of the Sonho assistant. This crate sits on top of
//! `knowledge_store`, routes each utterance through an ordered rule chain,
//! and answers from stored facts.
//!
//! ## Core Components
//!
//! - **retrieval**: Lexical (vocabulary-scored) and semantic (embedding) fact search
//! - **dispatcher**: The ordered intent chain - commands, greetings, farewells,
//!   question patterns, then retrieval, entity, and filler fallbacks
//! - **session**: Runs a full turn - dispatch, record, persist
//! - **config**: TOML-loadable command table, phrase sets, and patterns
//!
//! ## Turn Flow
//!
//! 1. **Normalize**: The utterance is tokenized by the store's normalizer
//! 2. **Context**: Current topic and follow-up suggestions are refreshed
//! 3. **Dispatch**: Rules are evaluated top-down, first match wins
//! 4. **Fallback**: Retrieval, then entity acknowledgement, then filler
//! 5. **Record**: The turn is appended to conversation memory and saved

mod error;

pub mod collaborators;
pub mod config;
pub mod dispatcher;
pub mod retrieval;
pub mod session;

pub use collaborators::*;
pub use config::*;
pub use dispatcher::*;
pub use error::*;
pub use retrieval::*;
pub use session::*;
