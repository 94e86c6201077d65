
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::Product;
use crate::embeddings::EmbeddingBackend;
use crate::engine::vocabulary::Vocabulary;
use crate::{FurniError, Result};

/// One product with everything the scorer needs precomputed: the weighted
/// embedding and the expanded keyword term sets per facet.
#[derive(Debug, Clone)]
pub struct IndexedProduct {
    pub product: Product,
    pub embedding: Vec<f32>,
    pub category_terms: BTreeSet<String>,
    pub material_terms: BTreeSet<String>,
    pub color_terms: BTreeSet<String>,
}

/// Read-only searchable representation of the catalog.
#[derive(Debug)]
pub struct ProductIndex {
    entries: Vec<IndexedProduct>,
    embedding_dimension: usize,
    built_at: DateTime<Utc>,
}

/// A record excluded from the index, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedProduct {
    pub id: String,
    pub reason: String,
}

/// What happened during an index build.
#[derive(Debug, Clone, Default)]
pub struct IndexBuildReport {
    pub indexed: usize,
    pub rejected: Vec<RejectedProduct>,
}

impl ProductIndex {
    /// Build the index: validate records, embed each product's weighted
    /// text once, and precompute facet term sets.
    ///
    /// Individual invalid records are excluded and reported; the build only
    /// fails when no valid record remains or the backend fails.
    #[inline]
    pub fn build(
        products: Vec<Product>,
        vocabulary: &Vocabulary,
        backend: &dyn EmbeddingBackend,
    ) -> Result<(Self, IndexBuildReport)> {
        let total = products.len();
        let mut report = IndexBuildReport::default();
        let mut valid: Vec<Product> = Vec::with_capacity(total);
        let mut seen_ids: HashSet<String> = HashSet::new();

        for product in products {
            if let Err(reason) = validate_product(&product) {
                warn!("Excluding product '{}' from index: {}", product.id, reason);
                report.rejected.push(RejectedProduct {
                    id: product.id,
                    reason,
                });
                continue;
            }

            if !seen_ids.insert(product.id.clone()) {
                warn!("Excluding product '{}' from index: duplicate id", product.id);
                report.rejected.push(RejectedProduct {
                    id: product.id,
                    reason: "duplicate id".to_string(),
                });
                continue;
            }

            valid.push(product);
        }

        if valid.is_empty() {
            return Err(FurniError::Catalog(format!(
                "Index build failed: all {total} records invalid"
            )));
        }

        let texts: Vec<String> = valid.iter().map(weighted_text).collect();
        debug!("Embedding {} product texts", texts.len());

        let embeddings = backend
            .embed_batch(&texts)
            .map_err(|e| FurniError::Embedding(format!("product embedding failed: {e:#}")))?;

        if embeddings.len() != valid.len() {
            return Err(FurniError::Embedding(format!(
                "backend returned {} embeddings for {} products",
                embeddings.len(),
                valid.len()
            )));
        }

        let embedding_dimension = embeddings.first().map_or(0, Vec::len);
        if embedding_dimension == 0 {
            return Err(FurniError::Embedding(
                "backend returned empty embeddings".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(valid.len());
        for (product, embedding) in valid.into_iter().zip(embeddings) {
            if embedding.len() != embedding_dimension {
                return Err(FurniError::Embedding(format!(
                    "inconsistent embedding dimensions: expected {}, got {} for product '{}'",
                    embedding_dimension,
                    embedding.len(),
                    product.id
                )));
            }

            let categories = product.primary_categories().join(", ");
            let category_terms =
                vocabulary.category_terms(&[&categories, &product.title, &product.description]);
            let material_terms = vocabulary.material_terms(&[&product.material, &product.title]);
            let color_terms = vocabulary.color_terms(&[&product.color, &product.title]);

            entries.push(IndexedProduct {
                product,
                embedding,
                category_terms,
                material_terms,
                color_terms,
            });
        }

        report.indexed = entries.len();
        info!(
            "Built product index with {} entries ({} rejected, dimension {})",
            entries.len(),
            report.rejected.len(),
            embedding_dimension
        );

        Ok((
            Self {
                entries,
                embedding_dimension,
                built_at: Utc::now(),
            },
            report,
        ))
    }

    #[inline]
    pub fn entries(&self) -> &[IndexedProduct] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn embedding_dimension(&self) -> usize {
        self.embedding_dimension
    }

    #[inline]
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    #[inline]
    pub fn get(&self, product_id: &str) -> Option<&IndexedProduct> {
        self.entries.iter().find(|e| e.product.id == product_id)
    }
}

/// Shared handle to the current index. Rebuilds swap the whole index at
/// once; in-flight readers keep the snapshot they started with.
#[derive(Clone)]
pub struct IndexHandle {
    inner: Arc<RwLock<Arc<ProductIndex>>>,
}

impl IndexHandle {
    #[inline]
    pub fn new(index: ProductIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(index))),
        }
    }

    /// The current complete index.
    #[inline]
    pub fn snapshot(&self) -> Arc<ProductIndex> {
        Arc::clone(&self.inner.read())
    }

    /// Atomically publish a freshly built index.
    #[inline]
    pub fn replace(&self, index: ProductIndex) {
        let mut guard = self.inner.write();
        *guard = Arc::new(index);
    }
}

/// Composite text biased toward the fields that matter most: title three
/// times, description twice, categories and material/color once.
fn weighted_text(product: &Product) -> String {
    let title = product.title.trim();
    let description = product.description.trim();
    let categories = product.primary_categories().join(", ");
    let material_color = format!("{} {}", product.material, product.color)
        .trim()
        .to_string();

    let mut parts: Vec<&str> = vec![title, title, title];
    parts.push(description);
    parts.push(description);
    parts.push(&categories);
    parts.push(&material_color);

    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn validate_product(product: &Product) -> Result<(), String> {
    if product.id.trim().is_empty() {
        return Err("missing id".to_string());
    }

    if product.title.trim().is_empty() {
        return Err("missing title".to_string());
    }

    if !product.price.is_finite() || product.price < 0.0 {
        return Err(format!("invalid price {}", product.price));
    }

    Ok(())
}
