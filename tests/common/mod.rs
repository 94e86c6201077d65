//! Shared helpers for integration tests.

use anyhow::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Write;
use tempfile::NamedTempFile;

use furnimatch::embeddings::EmbeddingBackend;
use furnimatch::engine::query::tokenize;

pub const EMBEDDING_DIMENSION: usize = 64;

/// Deterministic offline embedding backend: a hashed bag of words, so
/// texts sharing tokens get similar vectors.
pub struct BagOfWordsEmbedder;

impl EmbeddingBackend for BagOfWordsEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0_f32; EMBEDDING_DIMENSION];
        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = usize::try_from(hasher.finish() % EMBEDDING_DIMENSION as u64)?;
            vector[bucket] += 1.0;
        }
        Ok(vector)
    }
}

pub const CSV_HEADER: &str =
    "uniq_id,title,brand,price,categories,description,images,material,color";

/// Write a catalog CSV with the standard header and the given data rows.
pub fn write_catalog_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp csv");
    writeln!(file, "{CSV_HEADER}").expect("write header");
    for row in rows {
        writeln!(file, "{row}").expect("write row");
    }
    file
}

/// A small furniture catalog exercising categories, materials, and colors.
pub fn demo_rows() -> Vec<&'static str> {
    vec![
        "p1,Modern Velvet Sofa,Acme,899.99,\"['Sofas', 'Living Room Furniture']\",A plush velvet sofa for the living room,https://img.example/p1.jpg,Velvet,Navy Blue",
        "p2,Rustic Dining Table,Oakworks,\"$1,299.99\",\"['Tables', 'Dining']\",Solid oak dining table,,Oak,Natural Wood",
        "p3,Navy Linen Loveseat,Acme,459.00,\"['Sofas']\",Compact two-seater,,Linen,Navy",
        "p4,White Plastic Garden Chair,Gardena,25.50,\"['Outdoor', 'Chairs']\",Stackable outdoor chair,,Plastic,White",
        "p5,Steel Office Desk,Workly,320.00,\"['Office', 'Desks']\",Height adjustable desk,,Steel,Gray",
    ]
}
