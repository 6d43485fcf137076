//! Topic keys - the normalized names facts are grouped under.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Normalized key under which facts are grouped.
///
/// A topic is always lower-cased and trimmed, whichever way it was built
/// (constructor, conversion, or deserialization).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Create a topic, normalizing the raw text.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase())
    }

    /// The normalized topic text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the topic is empty after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Topic {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for Topic {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl Borrow<str> for Topic {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_normalization() {
        let topic = Topic::new("  Gato Preto ");
        assert_eq!(topic.as_str(), "gato preto");
        assert_eq!(topic, Topic::from("GATO PRETO"));
    }

    #[test]
    fn test_topic_deserialize_normalizes() {
        let topic: Topic = serde_json::from_str("\" Python \"").unwrap();
        assert_eq!(topic.as_str(), "python");
    }

    #[test]
    fn test_topic_empty() {
        assert!(Topic::new("   ").is_empty());
        assert!(!Topic::new("sol").is_empty());
    }

    #[test]
    fn test_topic_borrow_lookup() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(Topic::new("Sol"), 1);
        assert_eq!(map.get("sol"), Some(&1));
    }
}
