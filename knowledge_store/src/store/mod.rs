//! The `KnowledgeStore` facade - composes facts, vocabulary, relationships,
//! and memory behind one load/mutate/save lifecycle.

mod shared;

pub use shared::*;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::document::{KnowledgeDocument, Personality};
use crate::error::StoreResult;
use crate::facts::{Fact, FactStore, Topic};
use crate::memory::{ConversationMemory, ConversationTurn};
use crate::nlp::{BasicNormalizer, Embedder, TextNormalizer};
use crate::relationships::RelationshipGraph;
use crate::storage::DocumentStorage;
use crate::vocabulary::VocabularyIndex;

/// Topic used for document paragraphs with no usable keyword.
pub const GENERAL_TOPIC: &str = "geral";

/// The knowledge facade.
///
/// Loaded once at construction, mutated through methods, and written back as
/// a whole document whenever a mutating operation succeeds.
pub struct KnowledgeStore {
    document: KnowledgeDocument,
    storage: Box<dyn DocumentStorage>,
    normalizer: Box<dyn TextNormalizer>,
    embedder: Option<Box<dyn Embedder>>,
}

impl KnowledgeStore {
    /// Open a store, loading whatever the storage holds.
    pub fn open(storage: impl DocumentStorage + 'static) -> Self {
        let document = KnowledgeDocument::load_or_default(&storage);
        Self {
            document,
            storage: Box::new(storage),
            normalizer: Box::new(BasicNormalizer),
            embedder: None,
        }
    }

    /// Replace the built-in normalizer.
    pub fn with_normalizer(mut self, normalizer: impl TextNormalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    /// Configure a sentence embedder for new facts and semantic search.
    pub fn with_embedder(mut self, embedder: impl Embedder + 'static) -> Self {
        self.embedder = Some(Box::new(embedder));
        self
    }

    /// Normalize text into significant tokens.
    ///
    /// Falls back to [`BasicNormalizer`] when the configured normalizer fails.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        match self.normalizer.normalize(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "normalizer failed, using basic tokenization");
                BasicNormalizer.tokens(text)
            }
        }
    }

    /// Insert a fact and index it, without saving.
    ///
    /// The topic and the fact text are tokenized together; that one token set
    /// feeds both the vocabulary index and the relationship graph, which
    /// drops the topic's own words.
    ///
    /// Returns `false` without mutation if the topic already holds this exact
    /// text (or either side is empty).
    pub fn add_fact(&mut self, topic: &str, text: &str) -> bool {
        let topic = Topic::new(topic);
        let text = text.trim();
        if topic.is_empty() || text.is_empty() || self.document.facts.contains(topic.as_str(), text)
        {
            return false;
        }

        let mut fact = Fact::new(text);
        if let Some(embedder) = &self.embedder {
            match embedder.embed(text) {
                Ok(embedding) => fact = fact.with_embedding(embedding),
                Err(e) => warn!(topic = %topic, error = %e, "storing fact without embedding"),
            }
        }

        // The topic's own words are indexed too, so asking for the topic by
        // name finds its facts.
        let tokens = self.tokens(&format!("{topic} {text}"));
        self.document.facts.insert(topic.clone(), fact);
        self.document.vocabulary.index(&topic, &tokens);
        self.document.relationships.update(&topic, &tokens);

        info!(topic = %topic, "fact learned");
        true
    }

    /// Insert a fact and persist the document if it was new.
    pub fn teach(&mut self, topic: &str, text: &str) -> StoreResult<bool> {
        let inserted = self.add_fact(topic, text);
        if inserted {
            self.save()?;
        }
        Ok(inserted)
    }

    /// Remove the first fact under `topic` with exactly this text, persisting on success.
    pub fn delete_fact(&mut self, topic: &str, text: &str) -> StoreResult<bool> {
        let removed = self.document.facts.delete(topic, text.trim());
        if removed {
            info!(topic = %Topic::new(topic), "fact deleted");
            self.save()?;
        }
        Ok(removed)
    }

    /// Learn a text document paragraph by paragraph, persisting once at the end.
    ///
    /// Each paragraph is filed under the first keyword (longer than three
    /// characters) of its first sentence, or [`GENERAL_TOPIC`]. The body is
    /// also kept under `name` in the document section.
    /// Returns the number of facts inserted.
    pub fn learn_document(&mut self, name: &str, content: &str) -> StoreResult<usize> {
        self.document
            .documents
            .insert(name.to_string(), content.to_string());
        let mut inserted = 0;

        for paragraph in content.split("\n\n").map(str::trim) {
            if paragraph.is_empty() {
                continue;
            }
            let first_sentence = paragraph
                .split_inclusive(['.', '!', '?'])
                .next()
                .unwrap_or(paragraph);
            let topic = self
                .tokens(first_sentence)
                .into_iter()
                .find(|t| t.chars().count() > 3)
                .unwrap_or_else(|| GENERAL_TOPIC.to_string());

            if self.add_fact(&topic, paragraph) {
                inserted += 1;
            }
        }

        debug!(document = name, inserted, "document learned");
        self.save()?;
        Ok(inserted)
    }

    /// Fact texts for a topic, empty if unknown.
    pub fn facts_for(&self, topic: &str) -> Vec<&str> {
        self.document.facts.facts_for(topic)
    }

    /// All known topics.
    pub fn all_topics(&self) -> Vec<&Topic> {
        self.document.facts.all_topics()
    }

    /// Up to `limit` topics that have not been taught anything recently.
    pub fn old_facts(&self, limit: usize) -> Vec<&Topic> {
        self.document.facts.old_facts(limit, Utc::now())
    }

    /// Words co-occurring with a topic in its facts.
    pub fn infer_relationship(&self, topic: &str) -> &[String] {
        self.document.relationships.related_to(topic)
    }

    /// Whether a word appears in the vocabulary.
    pub fn is_known_word(&self, word: &str) -> bool {
        self.document.vocabulary.contains(word)
    }

    /// Record a conversation turn and persist.
    pub fn record_conversation(&mut self, user: &str, ai: &str) -> StoreResult<()> {
        self.document.memory.record(ConversationTurn::new(user, ai));
        self.save()
    }

    /// Write the whole document to storage.
    pub fn save(&mut self) -> StoreResult<()> {
        self.document.last_updated = Utc::now();
        let json = self.document.to_json()?;
        self.storage.save(&json)
    }

    /// The fact store.
    pub fn facts(&self) -> &FactStore {
        &self.document.facts
    }

    /// The vocabulary index.
    pub fn vocabulary(&self) -> &VocabularyIndex {
        &self.document.vocabulary
    }

    /// The relationship graph.
    pub fn relationships(&self) -> &RelationshipGraph {
        &self.document.relationships
    }

    /// Conversation buffers.
    pub fn memory(&self) -> &ConversationMemory {
        &self.document.memory
    }

    /// The assistant's persona.
    pub fn personality(&self) -> &Personality {
        &self.document.personality
    }

    /// The configured embedder, if any.
    pub fn embedder(&self) -> Option<&dyn Embedder> {
        self.embedder.as_deref()
    }

    /// The full in-memory document.
    pub fn document(&self) -> &KnowledgeDocument {
        &self.document
    }
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("topics", &self.document.facts.topic_count())
            .field("words", &self.document.vocabulary.len())
            .field("embedder", &self.embedder.is_some())
            .finish()
    }
}
