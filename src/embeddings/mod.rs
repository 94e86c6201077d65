// Embeddings module
// Ollama integration and the backend seam the engine is written against

pub mod ollama;

pub use ollama::OllamaClient;

use anyhow::Result;

/// Black-box text embedding backend. Implementations must be deterministic:
/// identical input text yields the identical vector.
pub trait EmbeddingBackend: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
