//! Optional tool collaborators behind the calculate and analyze-code commands.
//!
//! The dialogue core only routes to these; evaluating arithmetic or reading
//! source code is left to whoever implements them.

use knowledge_store::CollaboratorError;

/// Evaluates an arithmetic expression.
pub trait Calculator: Send + Sync {
    fn evaluate(&self, expression: &str) -> Result<f64, CollaboratorError>;
}

/// Produces a short human-readable summary of a code snippet.
pub trait CodeAnalyzer: Send + Sync {
    fn analyze(&self, source: &str) -> Result<String, CollaboratorError>;
}
