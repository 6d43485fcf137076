//! Retrieval engine - ranks stored facts against a query.
//!
//! Two strategies are available:
//! 1. **Lexical**: vocabulary-index scoring over the top topics
//! 2. **Semantic**: cosine similarity between query and fact embeddings
//!
//! The default [`RetrievalEngine::search`] path tries semantic first when an
//! embedder is configured and falls back to lexical. It always yields one
//! ranked list, never a blend of both.

use knowledge_store::{CollaboratorError, KnowledgeStore, Topic};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Configuration for the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of best-scoring topics expanded into facts.
    pub max_topics: usize,

    /// Maximum number of lexical results returned.
    pub max_results: usize,

    /// Number of results requested from semantic search.
    pub semantic_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_topics: 5,
            max_results: 5,
            semantic_top_k: 3,
        }
    }
}

/// A fact matched by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFact {
    pub topic: Topic,
    pub text: String,
    pub score: f32,
}

/// Stable descending sort by score; ties keep their incoming order.
fn sort_by_score_desc(results: &mut [ScoredFact]) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Ranks facts held by a [`KnowledgeStore`].
#[derive(Debug, Clone, Default)]
pub struct RetrievalEngine {
    config: RetrievalConfig,
}

impl RetrievalEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RetrievalConfig::default())
    }

    /// The active configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Vocabulary-scored search.
    ///
    /// # Algorithm
    ///
    /// 1. Normalize the query and score topics through the vocabulary index
    /// 2. Keep the best `max_topics` topics (ties keep first-encountered order)
    /// 3. Expand each topic into its facts, carrying the topic score
    /// 4. Re-sort by score and keep `max_results`
    pub fn lexical_search(&self, store: &KnowledgeStore, query: &str) -> Vec<ScoredFact> {
        let tokens = store.tokens(query);
        let mut topics = store.vocabulary().score(&tokens);
        topics.sort_by(|a, b| b.1.cmp(&a.1));
        topics.truncate(self.config.max_topics);

        let mut results: Vec<ScoredFact> = topics
            .into_iter()
            .flat_map(|(topic, score)| {
                store
                    .facts_for(topic.as_str())
                    .into_iter()
                    .map(|text| ScoredFact {
                        topic: topic.clone(),
                        text: text.to_string(),
                        score: score as f32,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        sort_by_score_desc(&mut results);
        results.truncate(self.config.max_results);

        debug!(query, results = results.len(), "lexical search");
        results
    }

    /// Embedding-similarity search over every fact that has an embedding.
    ///
    /// Fails when no embedder is configured or the embedder itself fails.
    pub fn semantic_search(
        &self,
        store: &KnowledgeStore,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredFact>, CollaboratorError> {
        let embedder = store
            .embedder()
            .ok_or_else(|| CollaboratorError::new("embedder", "not configured"))?;
        let query_embedding = embedder.embed(query)?;

        let mut results: Vec<ScoredFact> = store
            .facts()
            .iter()
            .filter_map(|(topic, fact)| {
                let embedding = fact.embedding.as_deref()?;
                Some(ScoredFact {
                    topic: topic.clone(),
                    text: fact.text.clone(),
                    score: embedder.similarity(&query_embedding, embedding),
                })
            })
            .collect();

        sort_by_score_desc(&mut results);
        results.truncate(k);

        debug!(query, results = results.len(), "semantic search");
        Ok(results)
    }

    /// The default single-list search: semantic first, lexical as fallback.
    ///
    /// Never fails; collaborator errors degrade to lexical search.
    pub fn search(&self, store: &KnowledgeStore, query: &str) -> Vec<ScoredFact> {
        if store.embedder().is_some() {
            match self.semantic_search(store, query, self.config.semantic_top_k) {
                Ok(results) if !results.is_empty() => return results,
                Ok(_) => {}
                Err(e) => warn!(error = %e, "semantic search failed, using lexical"),
            }
        }
        self.lexical_search(store, query)
    }
}
