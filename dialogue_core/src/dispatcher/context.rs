//! Short-lived conversational context carried between turns.

use knowledge_store::{Entity, KnowledgeStore, Topic};
use serde::{Deserialize, Serialize};

/// What the dispatcher remembers about the current exchange.
///
/// Rebuilt at the start of every turn and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationalContext {
    /// Best topic candidate from the latest utterance.
    pub current_topic: Option<Topic>,

    /// Entities acknowledged by the entity fallback.
    pub last_entities: Vec<String>,

    /// Suggestions drawn from words related to the current topic.
    pub follow_up_questions: Vec<String>,
}

impl ConversationalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the context for a new utterance.
    ///
    /// The current topic is the first entity naming a known topic, else the
    /// first token naming one, else the first entity at all.
    pub fn refresh(
        &mut self,
        store: &KnowledgeStore,
        tokens: &[String],
        entities: &[Entity],
        template: &str,
        max_follow_ups: usize,
    ) {
        let is_known = |candidate: &str| !store.facts_for(candidate).is_empty();

        self.current_topic = entities
            .iter()
            .map(|e| e.span.as_str())
            .find(|span| is_known(span))
            .or_else(|| tokens.iter().map(String::as_str).find(|t| is_known(t)))
            .or_else(|| entities.first().map(|e| e.span.as_str()))
            .map(Topic::new)
            .filter(|topic| !topic.is_empty());

        self.last_entities.clear();

        self.follow_up_questions = match &self.current_topic {
            Some(topic) => store
                .infer_relationship(topic.as_str())
                .iter()
                .take(max_follow_ups)
                .map(|word| template.replace("{word}", word))
                .collect(),
            None => Vec::new(),
        };
    }
}
