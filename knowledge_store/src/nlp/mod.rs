//! Natural-language collaborators.
//!
//! Tokenization, embedding, and entity extraction are external services
//! consumed through narrow traits. The built-in implementations here are
//! the fallbacks used when no richer collaborator is configured.

mod stopwords;

pub use stopwords::*;

/// A collaborator failed or is not available.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{collaborator} unavailable: {message}")]
pub struct CollaboratorError {
    pub collaborator: &'static str,
    pub message: String,
}

impl CollaboratorError {
    /// Create an error for the named collaborator.
    pub fn new(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self {
            collaborator,
            message: message.into(),
        }
    }
}

/// Text -> ordered sequence of significant tokens.
pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> Result<Vec<String>, CollaboratorError>;
}

/// Sentence embedding service.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError>;

    /// Similarity between two embeddings. Cosine by default.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }
}

/// A named-entity span found in an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub span: String,
    pub label: String,
}

impl Entity {
    pub fn new(span: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            span: span.into(),
            label: label.into(),
        }
    }
}

/// Best-effort named-entity extraction.
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Result<Vec<Entity>, CollaboratorError>;
}

/// Lower-cases, splits on anything that is not a letter or digit, and drops
/// stop words. No lemmatization.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicNormalizer;

impl BasicNormalizer {
    /// Infallible form of [`TextNormalizer::normalize`].
    pub fn tokens(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !is_stop_word(w))
            .map(str::to_string)
            .collect()
    }
}

impl TextNormalizer for BasicNormalizer {
    fn normalize(&self, text: &str) -> Result<Vec<String>, CollaboratorError> {
        Ok(self.tokens(text))
    }
}

/// Label given to entities produced by [`KeywordExtractor`].
pub const KEYWORD_LABEL: &str = "KEYWORD";

/// Entity fallback: every distinct token longer than 3 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    /// Infallible form of [`EntityExtractor::extract`].
    pub fn keywords(&self, text: &str) -> Vec<Entity> {
        let mut keywords: Vec<Entity> = Vec::new();
        for token in BasicNormalizer.tokens(text) {
            if token.chars().count() > 3 && !keywords.iter().any(|e| e.span == token) {
                keywords.push(Entity::new(token, KEYWORD_LABEL));
            }
        }
        keywords
    }
}

impl EntityExtractor for KeywordExtractor {
    fn extract(&self, text: &str) -> Result<Vec<Entity>, CollaboratorError> {
        Ok(self.keywords(text))
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
