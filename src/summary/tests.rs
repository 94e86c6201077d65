use super::*;
use crate::catalog::Product;
use crate::engine::{Recommendation, ScoredMatch};

fn recommendation(id: &str, title: &str, material: &str, category: &str, score: f32) -> Recommendation {
    Recommendation {
        product: Product {
            id: id.to_string(),
            title: title.to_string(),
            brand: "Acme".to_string(),
            description: String::new(),
            price: 100.0,
            categories: vec![category.to_string()],
            material: material.to_string(),
            color: String::new(),
            image_url: String::new(),
            manufacturer: None,
            country_of_origin: None,
        },
        score: ScoredMatch {
            product_id: id.to_string(),
            final_score: score,
            text_similarity: score,
            category_score: 0.0,
            material_score: 0.0,
            color_score: 0.0,
        },
    }
}

#[test]
fn empty_results_suggest_adjusting_the_search() {
    let summary = generate(&[], "invisible chair");
    assert!(summary.contains("couldn't find exact matches"));
}

#[test]
fn single_match_uses_singular_phrasing() {
    let results = vec![recommendation("p1", "Velvet Sofa", "velvet", "Sofas", 0.5)];
    let summary = generate(&results, "blue sofa");

    assert!(summary.contains("Found 1 great match for 'blue sofa'."));
}

#[test]
fn multiple_matches_report_the_count() {
    let results = vec![
        recommendation("p1", "Velvet Sofa", "velvet", "Sofas", 0.5),
        recommendation("p2", "Linen Loveseat", "linen", "Sofas", 0.4),
    ];
    let summary = generate(&results, "sofa");

    assert!(summary.contains("Found 2 excellent matches for 'sofa'."));
}

#[test]
fn strong_top_match_is_called_out() {
    let results = vec![recommendation("p1", "Velvet Sofa", "velvet", "Sofas", 0.9)];
    let summary = generate(&results, "sofa");

    assert!(summary.contains("Our top recommendation is the Velvet Sofa by Acme."));
}

#[test]
fn weak_top_match_is_not_called_out() {
    let results = vec![recommendation("p1", "Velvet Sofa", "velvet", "Sofas", 0.5)];
    let summary = generate(&results, "sofa");

    assert!(!summary.contains("top recommendation"));
}

#[test]
fn materials_mention_the_leading_results() {
    let results = vec![
        recommendation("p1", "Velvet Sofa", "velvet", "Sofas", 0.5),
        recommendation("p2", "Oak Table", "oak", "Tables", 0.4),
        recommendation("p3", "Velvet Chair", "velvet", "Chairs", 0.3),
    ];
    let summary = generate(&results, "furniture");

    assert!(summary.contains("These pieces feature velvet and oak construction."));
}

#[test]
fn short_or_empty_materials_are_skipped() {
    let results = vec![recommendation("p1", "Mystery Box", "", "Storage", 0.5)];
    let summary = generate(&results, "box");

    assert!(!summary.contains("construction"));
}

#[test]
fn dominant_category_shapes_the_closing_line() {
    let results = vec![
        recommendation("p1", "Velvet Sofa", "velvet", "Sofas", 0.5),
        recommendation("p2", "Linen Loveseat", "linen", "Sofas", 0.4),
        recommendation("p3", "Oak Table", "oak", "Tables", 0.3),
    ];
    let summary = generate(&results, "living room");

    assert!(summary.contains("Perfect for your sofas needs."));
}
