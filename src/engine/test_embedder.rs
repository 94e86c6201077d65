//! Deterministic in-process embedding backend for tests: a hashed
//! bag-of-words, so texts sharing tokens get similar vectors.

use anyhow::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::embeddings::EmbeddingBackend;
use crate::engine::query::tokenize;

pub(crate) const DIMENSION: usize = 64;

pub(crate) struct HashEmbedder;

impl EmbeddingBackend for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; DIMENSION];
        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = usize::try_from(hasher.finish() % DIMENSION as u64)?;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}
