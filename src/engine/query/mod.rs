
use std::sync::Arc;
use tracing::debug;

use crate::embeddings::EmbeddingBackend;
use crate::{FurniError, Result};

/// A query ready for scoring: the embedding for semantic similarity and the
/// normalized tokens for keyword overlap.
#[derive(Debug, Clone)]
pub struct EncodedQuery {
    pub text: String,
    pub embedding: Vec<f32>,
    pub tokens: Vec<String>,
}

/// Turns raw query strings into `EncodedQuery` values using the same
/// embedding backend the index was built with.
#[derive(Clone)]
pub struct QueryEncoder {
    backend: Arc<dyn EmbeddingBackend>,
}

impl QueryEncoder {
    #[inline]
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { backend }
    }

    /// Encode a query. Empty text is rejected before the backend is called;
    /// a backend failure is surfaced as-is, never replaced by a zero vector.
    #[inline]
    pub fn encode(&self, text: &str) -> Result<EncodedQuery> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(FurniError::InvalidInput(
                "query text cannot be empty".to_string(),
            ));
        }

        let embedding = self
            .backend
            .embed(trimmed)
            .map_err(|e| FurniError::Embedding(format!("query encoding failed: {e:#}")))?;

        let tokens = tokenize(trimmed);
        debug!(
            "Encoded query ({} dimensions, {} tokens)",
            embedding.len(),
            tokens.len()
        );

        Ok(EncodedQuery {
            text: trimmed.to_string(),
            embedding,
            tokens,
        })
    }
}

/// Lowercase and split on non-alphanumeric boundaries, dropping empties.
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
