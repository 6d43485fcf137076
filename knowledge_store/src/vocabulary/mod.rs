//! Vocabulary index - inverted index from significant words to topics.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::facts::Topic;
use crate::nlp::is_stop_word;

/// Index record for a single word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Topics whose facts contain this word, in first-seen order.
    #[serde(default)]
    pub topics: Vec<Topic>,

    /// Number of facts that contained this word. Never decremented.
    #[serde(default)]
    pub count: u64,
}

/// Word -> topics referencing it and a global occurrence count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabularyIndex {
    entries: BTreeMap<String, VocabularyEntry>,
}

impl VocabularyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the tokens of one inserted fact under `topic`.
    ///
    /// Tokens are deduplicated first, so a word repeated within the same fact
    /// still bumps its count by one.
    pub fn index(&mut self, topic: &Topic, tokens: &[String]) {
        let mut seen = HashSet::new();

        for token in tokens {
            let word = token.trim().to_lowercase();
            if word.is_empty() || is_stop_word(&word) || !seen.insert(word.clone()) {
                continue;
            }

            let entry = self.entries.entry(word).or_default();
            if !entry.topics.contains(topic) {
                entry.topics.push(topic.clone());
            }
            entry.count += 1;
        }
    }

    /// Score topics against query tokens.
    ///
    /// Every matched token adds its entry's global `count` to each topic the
    /// entry lists. Topics appear in the order they were first reached.
    pub fn score(&self, tokens: &[String]) -> Vec<(Topic, u64)> {
        let mut scores: Vec<(Topic, u64)> = Vec::new();

        for token in tokens {
            let Some(entry) = self.entries.get(token.to_lowercase().as_str()) else {
                continue;
            };
            for topic in &entry.topics {
                match scores.iter_mut().find(|(t, _)| t == topic) {
                    Some((_, score)) => *score += entry.count,
                    None => scores.push((topic.clone(), entry.count)),
                }
            }
        }

        scores
    }

    /// Look up the entry for a word.
    pub fn entry(&self, word: &str) -> Option<&VocabularyEntry> {
        self.entries.get(word.to_lowercase().as_str())
    }

    /// Check whether a word has been seen in any fact.
    pub fn contains(&self, word: &str) -> bool {
        self.entry(word).is_some()
    }

    /// Get the number of indexed words.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_index_creates_entries() {
        let mut index = VocabularyIndex::new();
        let gato = Topic::new("gato");

        index.index(&gato, &tokens(&["animal", "doméstico", "comum"]));

        let entry = index.entry("animal").unwrap();
        assert_eq!(entry.topics, vec![gato]);
        assert_eq!(entry.count, 1);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_count_once_per_fact() {
        let mut index = VocabularyIndex::new();
        let topic = Topic::new("eco");

        index.index(&topic, &tokens(&["som", "som", "som"]));
        assert_eq!(index.entry("som").unwrap().count, 1);

        index.index(&topic, &tokens(&["som"]));
        let entry = index.entry("som").unwrap();
        assert_eq!(entry.count, 2);
        assert_eq!(entry.topics.len(), 1);
    }

    #[test]
    fn test_index_skips_stop_words() {
        let mut index = VocabularyIndex::new();
        index.index(&Topic::new("sol"), &tokens(&["the", "de", "estrela"]));

        assert!(!index.contains("the"));
        assert!(!index.contains("de"));
        assert!(index.contains("estrela"));
    }

    #[test]
    fn test_score_uses_global_count() {
        let mut index = VocabularyIndex::new();
        let gato = Topic::new("gato");
        let cachorro = Topic::new("cachorro");

        index.index(&gato, &tokens(&["animal", "felino"]));
        index.index(&cachorro, &tokens(&["animal", "canino"]));

        // "animal" has a global count of 2 and tags both topics.
        let scores = index.score(&tokens(&["animal", "felino"]));
        assert_eq!(scores, vec![(gato, 3), (cachorro, 2)]);
    }

    #[test]
    fn test_score_unknown_words() {
        let index = VocabularyIndex::new();
        assert!(index.score(&tokens(&["nada"])).is_empty());
    }
}
