// Recommendation engine
// Index, query encoding, multi-factor scoring, and the filter/rank pipeline

pub mod index;
pub mod query;
pub mod scorer;
pub mod vocabulary;

#[cfg(test)]
pub(crate) mod test_embedder;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::Product;
use crate::config::EngineConfig;
use crate::embeddings::EmbeddingBackend;
use crate::{FurniError, Result};

pub use index::{IndexBuildReport, IndexHandle, IndexedProduct, ProductIndex, RejectedProduct};
pub use query::{EncodedQuery, QueryEncoder};
pub use scorer::{MultiFactorScorer, ScoredMatch, cosine_similarity};
pub use vocabulary::Vocabulary;

/// One recommendation request. `top_k` falls back to the configured
/// default when unset.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RecommendRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub filters: Option<RecommendFilters>,
}

/// Hard post-filters. A product failing any supplied filter is excluded
/// regardless of score.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RecommendFilters {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub categories: Option<Vec<String>>,
    pub material: Option<String>,
    pub color: Option<String>,
}

/// A ranked result row: the product plus its score breakdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub product: Product,
    pub score: ScoredMatch,
}

/// The engine's public entry point. Holds the shared index handle, the
/// query encoder, and the scorer; `recommend` runs the whole pipeline.
pub struct RecommendationEngine {
    handle: IndexHandle,
    encoder: QueryEncoder,
    scorer: MultiFactorScorer,
    settings: EngineConfig,
    vocabulary: Vocabulary,
    backend: Arc<dyn EmbeddingBackend>,
}

impl RecommendationEngine {
    /// Build the initial index and assemble the engine around it.
    #[inline]
    pub fn new(
        products: Vec<Product>,
        vocabulary: Vocabulary,
        settings: EngineConfig,
        backend: Arc<dyn EmbeddingBackend>,
    ) -> Result<(Self, IndexBuildReport)> {
        let (index, report) = ProductIndex::build(products, &vocabulary, backend.as_ref())?;

        let engine = Self {
            handle: IndexHandle::new(index),
            encoder: QueryEncoder::new(Arc::clone(&backend)),
            scorer: MultiFactorScorer::new(settings.weights),
            settings,
            vocabulary,
            backend,
        };

        Ok((engine, report))
    }

    /// The current index snapshot.
    #[inline]
    pub fn index(&self) -> Arc<ProductIndex> {
        self.handle.snapshot()
    }

    #[inline]
    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    /// Rebuild the index from a fresh catalog and publish it atomically.
    /// In-flight requests keep the snapshot they started with.
    #[inline]
    pub fn rebuild(&self, products: Vec<Product>) -> Result<IndexBuildReport> {
        let (index, report) =
            ProductIndex::build(products, &self.vocabulary, self.backend.as_ref())?;
        info!("Publishing rebuilt index with {} products", index.len());
        self.handle.replace(index);
        Ok(report)
    }

    /// Score, threshold, filter, deduplicate, rank, and truncate.
    ///
    /// An empty result list is a valid outcome; only malformed input or a
    /// backend failure is an error.
    #[inline]
    pub fn recommend(&self, request: &RecommendRequest) -> Result<Vec<Recommendation>> {
        let top_k = request.top_k.unwrap_or(self.settings.default_top_k);
        if top_k == 0 {
            return Err(FurniError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }
        if top_k > self.settings.max_results {
            return Err(FurniError::InvalidInput(format!(
                "top_k {} exceeds the maximum of {}",
                top_k, self.settings.max_results
            )));
        }

        let index = self.handle.snapshot();
        let encoded = self.encoder.encode(&request.query)?;

        if encoded.embedding.len() != index.embedding_dimension() {
            return Err(FurniError::Embedding(format!(
                "query embedding dimension {} does not match index dimension {}",
                encoded.embedding.len(),
                index.embedding_dimension()
            )));
        }

        let scored = self.scorer.score_all(&encoded, &index);
        let filters = request.filters.as_ref();

        // Deduplicate by id, keeping the highest-scoring occurrence
        let mut by_id: BTreeMap<String, Recommendation> = BTreeMap::new();
        for (entry, score) in index.entries().iter().zip(scored) {
            if score.final_score < self.settings.min_similarity {
                continue;
            }
            if !passes_filters(&entry.product, filters) {
                continue;
            }

            let candidate = Recommendation {
                product: entry.product.clone(),
                score,
            };
            by_id
                .entry(candidate.product.id.clone())
                .and_modify(|existing| {
                    if candidate.score.final_score > existing.score.final_score {
                        *existing = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }

        let mut results: Vec<Recommendation> = by_id.into_values().collect();
        results.sort_by(|a, b| {
            b.score
                .final_score
                .total_cmp(&a.score.final_score)
                .then_with(|| a.product.price.total_cmp(&b.product.price))
                .then_with(|| a.product.id.cmp(&b.product.id))
        });
        results.truncate(top_k);

        debug!(
            "Query '{}' produced {} results (top_k {})",
            encoded.text,
            results.len(),
            top_k
        );

        Ok(results)
    }
}

fn passes_filters(product: &Product, filters: Option<&RecommendFilters>) -> bool {
    let Some(filters) = filters else {
        return true;
    };

    if filters.min_price.is_some_and(|min| product.price < min) {
        return false;
    }

    if filters.max_price.is_some_and(|max| product.price > max) {
        return false;
    }

    if let Some(categories) = &filters.categories {
        let wanted_terms: Vec<String> = categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        if !wanted_terms.is_empty() {
            let matched = wanted_terms.iter().any(|wanted| {
                product
                    .categories
                    .iter()
                    .any(|have| have.to_lowercase().contains(wanted))
            });
            if !matched {
                return false;
            }
        }
    }

    if let Some(material) = &filters.material {
        let wanted = material.trim().to_lowercase();
        if !wanted.is_empty() && !product.material.contains(&wanted) {
            return false;
        }
    }

    if let Some(color) = &filters.color {
        let wanted = color.trim().to_lowercase();
        if !wanted.is_empty() && !product.color.contains(&wanted) {
            return false;
        }
    }

    true
}
