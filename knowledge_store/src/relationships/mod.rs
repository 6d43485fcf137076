//! Relationship graph - co-occurrence edges from a topic to the words of its facts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::facts::Topic;

/// Words must be longer than this (in characters) to become an edge.
pub const MIN_RELATED_WORD_CHARS: usize = 3;

/// Topic -> set of co-occurring content words.
///
/// Edges accumulate and are never pruned. The graph is advisory only: it
/// feeds follow-up suggestions and the infer command, never scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipGraph {
    edges: BTreeMap<Topic, Vec<String>>,
}

impl RelationshipGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the significant tokens of a fact as edges of `topic`.
    ///
    /// The topic is never related to itself, nor to any word of a multi-word
    /// topic.
    pub fn update(&mut self, topic: &Topic, tokens: &[String]) {
        for token in tokens {
            let word = token.trim().to_lowercase();
            if word.chars().count() <= MIN_RELATED_WORD_CHARS
                || word == topic.as_str()
                || topic.as_str().split_whitespace().any(|part| part == word)
            {
                continue;
            }

            let related = self.edges.entry(topic.clone()).or_default();
            if !related.contains(&word) {
                related.push(word);
            }
        }
    }

    /// Words related to a topic, empty if none were recorded.
    pub fn related_to(&self, topic: &str) -> &[String] {
        let topic = Topic::new(topic);
        self.edges
            .get(topic.as_str())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get the number of topics with at least one edge.
    pub fn topic_count(&self) -> usize {
        self.edges.len()
    }
}
