
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::config::BlendWeights;
use crate::engine::index::{IndexedProduct, ProductIndex};
use crate::engine::query::EncodedQuery;

/// Per-product relevance breakdown for one query. All scores are in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMatch {
    pub product_id: String,
    pub final_score: f32,
    pub text_similarity: f32,
    pub category_score: f32,
    pub material_score: f32,
    pub color_score: f32,
}

/// Blends semantic similarity with the keyword facet scores.
///
/// Scoring is a pure function of the query, the index, and the weights:
/// no randomness, no hidden state.
#[derive(Debug, Clone)]
pub struct MultiFactorScorer {
    weights: BlendWeights,
}

impl MultiFactorScorer {
    #[inline]
    pub fn new(weights: BlendWeights) -> Self {
        Self { weights }
    }

    /// Score every indexed product against the query.
    ///
    /// When the query carries none of the category/material/color
    /// vocabulary of any product, the keyword weights would only drag every
    /// score down; ranking falls back to text similarity alone for that
    /// request.
    #[inline]
    pub fn score_all(&self, query: &EncodedQuery, index: &ProductIndex) -> Vec<ScoredMatch> {
        let mut matches: Vec<ScoredMatch> = index
            .entries()
            .iter()
            .map(|entry| self.score_entry(query, entry))
            .collect();

        let has_keyword_signal = matches.iter().any(|m| {
            m.category_score > 0.0 || m.material_score > 0.0 || m.color_score > 0.0
        });

        if !has_keyword_signal {
            debug!("No keyword overlap for query; ranking by text similarity alone");
            for scored in &mut matches {
                scored.final_score = scored.text_similarity;
            }
        }

        matches
    }

    fn score_entry(&self, query: &EncodedQuery, entry: &IndexedProduct) -> ScoredMatch {
        let text_similarity = cosine_similarity(&query.embedding, &entry.embedding).clamp(0.0, 1.0);
        let category_score = keyword_overlap(&query.tokens, &entry.category_terms);
        let material_score = keyword_overlap(&query.tokens, &entry.material_terms);
        let color_score = keyword_overlap(&query.tokens, &entry.color_terms);

        let final_score = self.weights.text * text_similarity
            + self.weights.category * category_score
            + self.weights.material * material_score
            + self.weights.color * color_score;

        ScoredMatch {
            product_id: entry.product.id.clone(),
            final_score,
            text_similarity,
            category_score,
            material_score,
            color_score,
        }
    }
}

/// Dot product over the product of magnitudes; 0 when either vector has
/// zero magnitude.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Fraction of query tokens present in the expanded term set. Plural
/// tokens match their singular term ("sofas" counts for "sofa").
fn keyword_overlap(tokens: &[String], terms: &BTreeSet<String>) -> f32 {
    if tokens.is_empty() || terms.is_empty() {
        return 0.0;
    }

    let matched = tokens
        .iter()
        .filter(|token| {
            terms.contains(token.as_str())
                || token
                    .strip_suffix('s')
                    .is_some_and(|stem| terms.contains(stem))
        })
        .count();
    matched as f32 / tokens.len() as f32
}
