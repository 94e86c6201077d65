#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// End-to-end: CSV catalog -> index build -> recommendation pipeline,
// using a deterministic offline embedding backend.

mod common;

use common::{BagOfWordsEmbedder, demo_rows, write_catalog_csv};
use std::sync::Arc;

use furnimatch::catalog::load_catalog;
use furnimatch::config::EngineConfig;
use furnimatch::engine::{
    RecommendFilters, RecommendRequest, RecommendationEngine, Vocabulary,
};
use furnimatch::mcp::ToolHandler;
use furnimatch::mcp::protocol::CallToolParams;
use furnimatch::mcp::tools::RecommendHandler;

fn build_engine(min_similarity: f32) -> RecommendationEngine {
    let file = write_catalog_csv(&demo_rows());
    let report = load_catalog(file.path()).expect("catalog should load");
    assert_eq!(report.products.len(), 5);

    let settings = EngineConfig {
        min_similarity,
        ..EngineConfig::default()
    };
    let (engine, build_report) = RecommendationEngine::new(
        report.products,
        Vocabulary::default(),
        settings,
        Arc::new(BagOfWordsEmbedder),
    )
    .expect("engine should build");
    assert_eq!(build_report.indexed, 5);

    engine
}

fn request(query: &str) -> RecommendRequest {
    RecommendRequest {
        query: query.to_string(),
        top_k: None,
        filters: None,
    }
}

#[test]
fn csv_to_ranked_results() {
    let engine = build_engine(0.0);

    let results = engine
        .recommend(&request("blue velvet sofa"))
        .expect("recommend should succeed");

    assert!(!results.is_empty());
    assert_eq!(results[0].product.id, "p1");
    assert!(results[0].score.category_score > 0.0);
    assert!(results[0].score.material_score > 0.0);
    assert!(results[0].score.color_score > 0.0);
}

#[test]
fn price_cap_empties_the_results() {
    let engine = build_engine(0.0);

    let results = engine
        .recommend(&RecommendRequest {
            filters: Some(RecommendFilters {
                max_price: Some(20.0),
                ..RecommendFilters::default()
            }),
            ..request("blue velvet sofa")
        })
        .expect("empty results are valid");

    assert!(results.is_empty());
}

#[test]
fn repeated_requests_return_identical_rankings() {
    let engine = build_engine(0.0);
    let request = RecommendRequest {
        top_k: Some(5),
        filters: Some(RecommendFilters {
            min_price: Some(20.0),
            categories: Some(vec!["sofas".to_string(), "chairs".to_string()]),
            ..RecommendFilters::default()
        }),
        ..request("navy seating for the living room")
    };

    let first = engine.recommend(&request).expect("first call");
    let second = engine.recommend(&request).expect("second call");

    assert_eq!(first, second);
    for result in &first {
        assert!(result.product.price >= 20.0);
    }
}

#[test]
fn rebuild_from_a_new_csv_swaps_the_catalog() {
    let engine = build_engine(0.0);

    let replacement = write_catalog_csv(&[
        "n1,Walnut Bed Frame,Dreamy,640.00,\"['Beds']\",Queen size bed frame,,Walnut,Brown",
    ]);
    let report = load_catalog(replacement.path()).expect("replacement loads");
    engine.rebuild(report.products).expect("rebuild succeeds");

    let results = engine
        .recommend(&request("walnut bed frame"))
        .expect("recommend should succeed");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].product.id, "n1");
}

#[tokio::test]
async fn recommend_tool_speaks_the_wire_format() {
    let engine = Arc::new(build_engine(0.0));
    let handler = RecommendHandler::new(engine);

    let arguments = serde_json::json!({
        "query": "blue velvet sofa",
        "top_k": 3,
        "filters": {"max_price": 1000.0, "categories": ["sofas"]}
    });
    let params = CallToolParams {
        name: "recommend_products".to_string(),
        arguments: serde_json::from_value(arguments).expect("valid arguments"),
    };

    let result = handler.handle(params).await.expect("handler works");
    assert_eq!(result.is_error, Some(false));

    let furnimatch::mcp::protocol::ToolContent::Text { text } = &result.content[0];
    let payload: serde_json::Value = serde_json::from_str(text).expect("valid JSON");

    let products = payload["products"].as_array().expect("products array");
    assert!(!products.is_empty());
    for product in products {
        assert!(product["price"].as_f64().expect("price") <= 1000.0);
        assert!(product["similarity_score"].is_number());
    }
    assert_eq!(payload["products"][0]["uniq_id"], serde_json::Value::Null);
    assert_eq!(payload["products"][0]["id"], "p1");
}
