//! Fact definitions and the topic-keyed fact store.

mod topic;

pub use topic::*;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A topic whose most recent fact is older than this is considered stale.
pub const STALE_AFTER_DAYS: i64 = 10;

fn default_confidence() -> f32 {
    1.0
}

/// A single taught statement.
///
/// Facts are never mutated in place; they are appended on teach and removed
/// by exact text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Human-readable content of the fact.
    pub text: String,

    /// When this fact was taught.
    pub timestamp: DateTime<Utc>,

    /// Confidence score (0.0 - 1.0).
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Sentence embedding, present only when an embedder was configured at teach time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Fact {
    /// Create a new fact stamped with the current time and full confidence.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
            confidence: default_confidence(),
            embedding: None,
        }
    }

    /// Set the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the confidence score.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Attach a sentence embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Topic -> ordered list of facts.
///
/// Owns deduplication: a `(topic, text)` pair is stored at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactStore {
    facts: BTreeMap<Topic, Vec<Fact>>,
}

impl FactStore {
    /// Create an empty fact store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fact under a topic unless the same text is already there.
    ///
    /// Returns `true` when the fact was inserted.
    pub fn insert(&mut self, topic: Topic, fact: Fact) -> bool {
        if topic.is_empty() || self.contains(topic.as_str(), &fact.text) {
            return false;
        }
        self.facts.entry(topic).or_default().push(fact);
        true
    }

    /// Check whether a topic already holds a fact with exactly this text.
    pub fn contains(&self, topic: &str, text: &str) -> bool {
        self.records_for(topic).iter().any(|f| f.text == text)
    }

    /// Fact texts for a topic in teaching order; empty when the topic is unknown.
    pub fn facts_for(&self, topic: &str) -> Vec<&str> {
        self.records_for(topic)
            .iter()
            .map(|f| f.text.as_str())
            .collect()
    }

    /// Full fact records for a topic.
    pub fn records_for(&self, topic: &str) -> &[Fact] {
        let topic = Topic::new(topic);
        self.facts
            .get(topic.as_str())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Remove the first fact under `topic` whose text matches exactly.
    ///
    /// A topic left without facts is dropped from the store.
    pub fn delete(&mut self, topic: &str, text: &str) -> bool {
        let topic = Topic::new(topic);
        let Some(facts) = self.facts.get_mut(topic.as_str()) else {
            return false;
        };
        let Some(position) = facts.iter().position(|f| f.text == text) else {
            return false;
        };
        facts.remove(position);
        if facts.is_empty() {
            self.facts.remove(topic.as_str());
        }
        true
    }

    /// All known topics.
    pub fn all_topics(&self) -> Vec<&Topic> {
        self.facts.keys().collect()
    }

    /// Up to `limit` topics whose most recent fact is older than
    /// [`STALE_AFTER_DAYS`] relative to `now`.
    ///
    /// The scan stops as soon as `limit` topics are found, so the result
    /// follows storage order rather than age.
    pub fn old_facts(&self, limit: usize, now: DateTime<Utc>) -> Vec<&Topic> {
        let threshold = Duration::days(STALE_AFTER_DAYS);
        let mut stale = Vec::new();

        for (topic, facts) in &self.facts {
            if stale.len() >= limit {
                break;
            }
            let Some(latest) = facts.iter().map(|f| f.timestamp).max() else {
                continue;
            };
            if now - latest > threshold {
                stale.push(topic);
            }
        }

        stale
    }

    /// Iterate over every `(topic, fact)` pair in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&Topic, &Fact)> {
        self.facts
            .iter()
            .flat_map(|(topic, facts)| facts.iter().map(move |f| (topic, f)))
    }

    /// Get the number of topics.
    pub fn topic_count(&self) -> usize {
        self.facts.len()
    }

    /// Get the total number of facts.
    pub fn fact_count(&self) -> usize {
        self.facts.values().map(Vec::len).sum()
    }

    /// Whether the store holds no facts at all.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_creation() {
        let fact = Fact::new("animal doméstico comum");
        assert_eq!(fact.text, "animal doméstico comum");
        assert_eq!(fact.confidence, 1.0);
        assert!(fact.embedding.is_none());
    }

    #[test]
    fn test_fact_confidence_clamping() {
        assert_eq!(Fact::new("x").with_confidence(1.5).confidence, 1.0);
        assert_eq!(Fact::new("x").with_confidence(-0.5).confidence, 0.0);
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut store = FactStore::new();

        assert!(store.insert(Topic::new("gato"), Fact::new("animal doméstico comum")));
        assert!(!store.insert(Topic::new("Gato "), Fact::new("animal doméstico comum")));

        assert_eq!(store.facts_for("gato"), vec!["animal doméstico comum"]);
        assert_eq!(store.fact_count(), 1);
    }

    #[test]
    fn test_insert_rejects_empty_topic() {
        let mut store = FactStore::new();
        assert!(!store.insert(Topic::new("  "), Fact::new("orphan")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_facts_for_unknown_topic() {
        let store = FactStore::new();
        assert!(store.facts_for("nada").is_empty());
    }

    #[test]
    fn test_facts_keep_teaching_order() {
        let mut store = FactStore::new();
        store.insert(Topic::new("sol"), Fact::new("é uma estrela"));
        store.insert(Topic::new("sol"), Fact::new("fica no centro do sistema solar"));

        assert_eq!(
            store.facts_for("SOL"),
            vec!["é uma estrela", "fica no centro do sistema solar"]
        );
    }

    #[test]
    fn test_delete_first_exact_match() {
        let mut store = FactStore::new();
        store.insert(Topic::new("sol"), Fact::new("é uma estrela"));
        store.insert(Topic::new("sol"), Fact::new("é quente"));

        assert!(!store.delete("sol", "é uma"));
        assert!(store.delete("sol", "é uma estrela"));
        assert_eq!(store.facts_for("sol"), vec!["é quente"]);

        assert!(store.delete("sol", "é quente"));
        assert!(store.all_topics().is_empty());
        assert!(!store.delete("lua", "qualquer"));
    }

    #[test]
    fn test_old_facts_uses_latest_timestamp() {
        let now = Utc::now();
        let mut store = FactStore::new();

        store.insert(
            Topic::new("antigo"),
            Fact::new("velho").with_timestamp(now - Duration::days(30)),
        );
        store.insert(
            Topic::new("misto"),
            Fact::new("velho").with_timestamp(now - Duration::days(30)),
        );
        store.insert(Topic::new("misto"), Fact::new("novo").with_timestamp(now));
        store.insert(Topic::new("recente"), Fact::new("novo").with_timestamp(now));

        let old = store.old_facts(3, now);
        assert_eq!(old, vec![&Topic::new("antigo")]);
    }

    #[test]
    fn test_old_facts_stops_at_limit() {
        let now = Utc::now();
        let mut store = FactStore::new();
        for name in ["a", "b", "c", "d"] {
            store.insert(
                Topic::new(name),
                Fact::new("velho").with_timestamp(now - Duration::days(11)),
            );
        }

        assert_eq!(store.old_facts(2, now).len(), 2);
        assert!(store.old_facts(0, now).is_empty());
    }

    #[test]
    fn test_iter_pairs() {
        let mut store = FactStore::new();
        store.insert(Topic::new("a"), Fact::new("1"));
        store.insert(Topic::new("a"), Fact::new("2"));
        store.insert(Topic::new("b"), Fact::new("3"));

        let pairs: Vec<_> = store
            .iter()
            .map(|(t, f)| (t.as_str(), f.text.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "1"), ("a", "2"), ("b", "3")]);
        assert_eq!(store.topic_count(), 2);
    }
}
