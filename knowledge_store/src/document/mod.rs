//! The persisted knowledge document - the single root aggregate.

mod legacy;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::error::StoreResult;
use crate::facts::FactStore;
use crate::memory::ConversationMemory;
use crate::relationships::RelationshipGraph;
use crate::storage::DocumentStorage;
use crate::vocabulary::VocabularyIndex;

/// The assistant's persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    pub name: String,
    pub traits: Vec<String>,
    pub interests: Vec<String>,
    pub greeting: String,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            name: "Sonho".to_string(),
            traits: vec!["curiosa".to_string(), "prestativa".to_string()],
            interests: vec!["aprender".to_string(), "conversar".to_string()],
            greeting: "Olá! Eu sou Sonho, sua assistente virtual. Como posso te ajudar hoje?"
                .to_string(),
        }
    }
}

/// Everything the assistant knows, persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeDocument {
    pub facts: FactStore,
    pub vocabulary: VocabularyIndex,
    pub relationships: RelationshipGraph,
    #[serde(flatten)]
    pub memory: ConversationMemory,
    pub personality: Personality,
    /// Learned document bodies by name, kept verbatim.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub documents: BTreeMap<String, String>,
    pub last_updated: DateTime<Utc>,
}

impl Default for KnowledgeDocument {
    fn default() -> Self {
        Self {
            facts: FactStore::default(),
            vocabulary: VocabularyIndex::default(),
            relationships: RelationshipGraph::default(),
            memory: ConversationMemory::default(),
            personality: Personality::default(),
            documents: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl KnowledgeDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document, upgrading legacy shapes and filling missing sections.
    pub fn from_json(raw: &str) -> StoreResult<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let upgraded = legacy::upgrade(value, Utc::now());
        let mut document: KnowledgeDocument = serde_json::from_value(upgraded)?;
        document.memory.enforce_capacity();
        Ok(document)
    }

    /// Serialize the whole document as pretty-printed JSON.
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from storage, falling back to an empty document.
    ///
    /// A missing document, an unreadable one, and a corrupt one all yield the
    /// default structure; only the latter two are logged.
    pub fn load_or_default(storage: &dyn DocumentStorage) -> Self {
        let raw = match storage.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("no knowledge document found, starting empty");
                return Self::default();
            }
            Err(e) => {
                warn!(error = %e, "knowledge document unreadable, starting empty");
                return Self::default();
            }
        };

        match Self::from_json(&raw) {
            Ok(document) => {
                info!(
                    topics = document.facts.topic_count(),
                    words = document.vocabulary.len(),
                    "knowledge document loaded"
                );
                document
            }
            Err(e) => {
                warn!(error = %e, "knowledge document corrupt, reinitializing");
                Self::default()
            }
        }
    }
}
