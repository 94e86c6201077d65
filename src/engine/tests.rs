use super::*;
use anyhow::anyhow;
use std::sync::Arc;

use crate::FurniError;
use crate::catalog::Product;
use crate::config::EngineConfig;
use crate::embeddings::EmbeddingBackend;
use crate::engine::test_embedder::HashEmbedder;

fn product(id: &str, title: &str, price: f64) -> Product {
    Product {
        id: id.to_string(),
        title: title.to_string(),
        brand: "Acme".to_string(),
        description: String::new(),
        price,
        categories: Vec::new(),
        material: String::new(),
        color: String::new(),
        image_url: String::new(),
        manufacturer: None,
        country_of_origin: None,
    }
}

fn demo_catalog() -> Vec<Product> {
    vec![
        Product {
            categories: vec!["Sofas".to_string(), "Living Room Furniture".to_string()],
            material: "velvet".to_string(),
            color: "navy blue".to_string(),
            description: "A plush velvet sofa".to_string(),
            ..product("p1", "Modern Velvet Sofa", 899.99)
        },
        Product {
            categories: vec!["Tables".to_string(), "Dining".to_string()],
            material: "oak".to_string(),
            color: "natural wood".to_string(),
            description: "Solid oak dining table".to_string(),
            ..product("p2", "Rustic Dining Table", 1299.99)
        },
        Product {
            categories: vec!["Sofas".to_string()],
            material: "linen".to_string(),
            color: "navy".to_string(),
            ..product("p3", "Navy Linen Loveseat", 459.0)
        },
        Product {
            categories: vec!["Outdoor".to_string(), "Chairs".to_string()],
            material: "plastic".to_string(),
            color: "white".to_string(),
            ..product("p4", "White Plastic Garden Chair", 25.5)
        },
        Product {
            categories: vec!["Office".to_string(), "Desks".to_string()],
            material: "steel".to_string(),
            color: "gray".to_string(),
            ..product("p5", "Steel Office Desk", 320.0)
        },
    ]
}

fn engine_with(products: Vec<Product>, min_similarity: f32) -> RecommendationEngine {
    let settings = EngineConfig {
        min_similarity,
        ..EngineConfig::default()
    };
    let (engine, _) = RecommendationEngine::new(
        products,
        Vocabulary::default(),
        settings,
        Arc::new(HashEmbedder),
    )
    .expect("engine should build");
    engine
}

fn request(query: &str) -> RecommendRequest {
    RecommendRequest {
        query: query.to_string(),
        top_k: None,
        filters: None,
    }
}

/// Succeeds at index-build time but refuses single-query embeds, so query
/// failure paths can be exercised on a working engine.
struct BuildOnlyBackend;

impl crate::embeddings::EmbeddingBackend for BuildOnlyBackend {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Err(anyhow!("backend offline"))
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| HashEmbedder.embed(text)).collect()
    }
}

#[test]
fn worked_example_ranks_the_sofa_first() {
    let engine = engine_with(demo_catalog(), 0.0);

    let results = engine
        .recommend(&request("blue velvet sofa"))
        .expect("recommend should succeed");

    assert!(!results.is_empty());
    assert_eq!(results[0].product.id, "p1");

    let p1_rank = results.iter().position(|r| r.product.id == "p1");
    let p2_rank = results.iter().position(|r| r.product.id == "p2");
    if let (Some(sofa), Some(table)) = (p1_rank, p2_rank) {
        assert!(sofa < table);
    }
}

#[test]
fn worked_example_with_price_cap_is_empty() {
    let engine = engine_with(
        vec![demo_catalog().remove(0), demo_catalog().remove(1)],
        0.0,
    );

    let results = engine
        .recommend(&RecommendRequest {
            filters: Some(RecommendFilters {
                max_price: Some(500.0),
                ..RecommendFilters::default()
            }),
            ..request("blue velvet sofa")
        })
        .expect("recommend should succeed");

    assert!(results.is_empty());
}

#[test]
fn recommend_is_deterministic() {
    let engine = engine_with(demo_catalog(), 0.0);
    let request = request("navy sofa for the living room");

    let first = engine.recommend(&request).expect("first call");
    let second = engine.recommend(&request).expect("second call");

    assert_eq!(first, second);
}

#[test]
fn raising_the_threshold_never_adds_results() {
    let query = "comfortable navy sofa";
    let mut previous_count = usize::MAX;

    for threshold in [0.0, 0.2, 0.4, 0.6, 0.8] {
        let engine = engine_with(demo_catalog(), threshold);
        let count = engine
            .recommend(&request(query))
            .expect("recommend should succeed")
            .len();

        assert!(
            count <= previous_count,
            "threshold {threshold} produced {count} results, more than {previous_count}"
        );
        previous_count = count;
    }
}

#[test]
fn price_filters_are_inclusive_bounds() {
    let engine = engine_with(demo_catalog(), 0.0);

    let results = engine
        .recommend(&RecommendRequest {
            top_k: Some(10),
            filters: Some(RecommendFilters {
                min_price: Some(320.0),
                max_price: Some(899.99),
                ..RecommendFilters::default()
            }),
            ..request("furniture")
        })
        .expect("recommend should succeed");

    assert!(!results.is_empty());
    for result in &results {
        assert!(result.product.price >= 320.0);
        assert!(result.product.price <= 899.99);
    }
    // Both bounds are inclusive
    assert!(results.iter().any(|r| r.product.price == 320.0));
    assert!(results.iter().any(|r| r.product.price == 899.99));
}

#[test]
fn category_filter_is_an_or_over_requested_categories() {
    let engine = engine_with(demo_catalog(), 0.0);

    let results = engine
        .recommend(&RecommendRequest {
            top_k: Some(10),
            filters: Some(RecommendFilters {
                categories: Some(vec!["sofas".to_string(), "OFFICE".to_string()]),
                ..RecommendFilters::default()
            }),
            ..request("furniture")
        })
        .expect("recommend should succeed");

    let mut ids: Vec<&str> = results.iter().map(|r| r.product.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["p1", "p3", "p5"]);
}

#[test]
fn material_and_color_filters_match_substrings() {
    let engine = engine_with(demo_catalog(), 0.0);

    let oak = engine
        .recommend(&RecommendRequest {
            top_k: Some(10),
            filters: Some(RecommendFilters {
                material: Some("Oak".to_string()),
                ..RecommendFilters::default()
            }),
            ..request("furniture")
        })
        .expect("recommend should succeed");
    assert_eq!(oak.len(), 1);
    assert_eq!(oak[0].product.id, "p2");

    let navy = engine
        .recommend(&RecommendRequest {
            top_k: Some(10),
            filters: Some(RecommendFilters {
                color: Some("navy".to_string()),
                ..RecommendFilters::default()
            }),
            ..request("furniture")
        })
        .expect("recommend should succeed");
    let mut ids: Vec<&str> = navy.iter().map(|r| r.product.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["p1", "p3"]);
}

#[test]
fn combined_filters_intersect() {
    let engine = engine_with(demo_catalog(), 0.0);

    let results = engine
        .recommend(&RecommendRequest {
            top_k: Some(10),
            filters: Some(RecommendFilters {
                categories: Some(vec!["sofas".to_string()]),
                max_price: Some(500.0),
                ..RecommendFilters::default()
            }),
            ..request("furniture")
        })
        .expect("recommend should succeed");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].product.id, "p3");
}

#[test]
fn filters_eliminating_everything_is_not_an_error() {
    let engine = engine_with(demo_catalog(), 0.0);

    let results = engine
        .recommend(&RecommendRequest {
            filters: Some(RecommendFilters {
                min_price: Some(100_000.0),
                ..RecommendFilters::default()
            }),
            ..request("furniture")
        })
        .expect("empty results are a valid outcome");

    assert!(results.is_empty());
}

#[test]
fn no_result_shares_a_product_id() {
    let engine = engine_with(demo_catalog(), 0.0);

    let results = engine
        .recommend(&RecommendRequest {
            top_k: Some(10),
            ..request("navy velvet sofa with oak legs")
        })
        .expect("recommend should succeed");

    let mut ids: Vec<&str> = results.iter().map(|r| r.product.id.as_str()).collect();
    ids.sort_unstable();
    let before = ids.len();
    ids.dedup();
    assert_eq!(ids.len(), before);
}

#[test]
fn results_are_bounded_by_top_k() {
    let engine = engine_with(demo_catalog(), 0.0);

    let results = engine
        .recommend(&RecommendRequest {
            top_k: Some(2),
            ..request("furniture")
        })
        .expect("recommend should succeed");

    assert!(results.len() <= 2);
}

#[test]
fn zero_top_k_is_invalid_input() {
    let engine = engine_with(demo_catalog(), 0.0);

    let result = engine.recommend(&RecommendRequest {
        top_k: Some(0),
        ..request("sofa")
    });
    assert!(matches!(result, Err(FurniError::InvalidInput(_))));
}

#[test]
fn oversized_top_k_is_invalid_input() {
    let engine = engine_with(demo_catalog(), 0.0);

    let result = engine.recommend(&RecommendRequest {
        top_k: Some(11),
        ..request("sofa")
    });
    assert!(matches!(result, Err(FurniError::InvalidInput(_))));
}

#[test]
fn blank_query_is_invalid_input() {
    let engine = engine_with(demo_catalog(), 0.0);

    let result = engine.recommend(&request("   "));
    assert!(matches!(result, Err(FurniError::InvalidInput(_))));
}

#[test]
fn query_backend_failure_is_surfaced() {
    let settings = EngineConfig::default();
    let (engine, _) = RecommendationEngine::new(
        demo_catalog(),
        Vocabulary::default(),
        settings,
        Arc::new(BuildOnlyBackend),
    )
    .expect("index build uses the batch path");

    let result = engine.recommend(&request("blue sofa"));
    assert!(matches!(result, Err(FurniError::Embedding(_))));
}

#[test]
fn unrecognized_vocabulary_falls_back_to_text_ranking() {
    let engine = engine_with(demo_catalog(), 0.0);

    let results = engine
        .recommend(&RecommendRequest {
            top_k: Some(10),
            ..request("something nice for my home")
        })
        .expect("recommend should succeed");

    assert!(!results.is_empty());
    for result in &results {
        assert_eq!(result.score.category_score, 0.0);
        assert_eq!(result.score.material_score, 0.0);
        assert_eq!(result.score.color_score, 0.0);
        assert_eq!(result.score.final_score, result.score.text_similarity);
    }

    // Ranking equals pure text-similarity ranking
    for pair in results.windows(2) {
        assert!(pair[0].score.text_similarity >= pair[1].score.text_similarity);
    }
}

#[test]
fn ties_break_by_price_then_id() {
    // Identical titles produce identical embeddings and identical scores.
    let engine = engine_with(
        vec![
            product("pb", "Plain Stool", 30.0),
            product("pa", "Plain Stool", 30.0),
            product("pc", "Plain Stool", 10.0),
        ],
        0.0,
    );

    let results = engine
        .recommend(&request("plain stool"))
        .expect("recommend should succeed");

    let ids: Vec<&str> = results.iter().map(|r| r.product.id.as_str()).collect();
    assert_eq!(ids, vec!["pc", "pa", "pb"]);
}

#[test]
fn rebuild_replaces_the_catalog_atomically() {
    let engine = engine_with(demo_catalog(), 0.0);
    let snapshot_before = engine.index();

    let report = engine
        .rebuild(vec![Product {
            categories: vec!["Beds".to_string()],
            ..product("p9", "Walnut Bed Frame", 640.0)
        }])
        .expect("rebuild should succeed");
    assert_eq!(report.indexed, 1);

    // Old snapshot is still complete; new requests see the new catalog.
    assert_eq!(snapshot_before.len(), 5);
    let results = engine
        .recommend(&request("walnut bed"))
        .expect("recommend should succeed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].product.id, "p9");
}

#[test]
fn failed_rebuild_keeps_the_old_index() {
    let engine = engine_with(demo_catalog(), 0.0);

    let result = engine.rebuild(vec![product("", "No Id", 1.0)]);
    assert!(result.is_err());

    assert_eq!(engine.index().len(), 5);
}
