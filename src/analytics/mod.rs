
use itertools::Itertools;
use serde::Serialize;

use crate::catalog::Product;

const TOP_N: usize = 10;

/// One labeled count, used for every breakdown in the analytics payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CountEntry {
    pub name: String,
    pub count: usize,
}

/// Catalog-wide aggregations for the dashboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogAnalytics {
    pub total_products: usize,
    pub avg_price: f64,
    pub price_distribution: Vec<CountEntry>,
    pub category_breakdown: Vec<CountEntry>,
    pub top_brands: Vec<CountEntry>,
    pub material_distribution: Vec<CountEntry>,
}

impl CatalogAnalytics {
    /// Compute every breakdown in one pass over the catalog.
    #[inline]
    pub fn compute(products: &[Product]) -> Self {
        let total_products = products.len();

        let avg_price = if products.is_empty() {
            0.0
        } else {
            let sum: f64 = products.iter().map(|p| p.price).sum();
            round2(sum / total_products as f64)
        };

        Self {
            total_products,
            avg_price,
            price_distribution: price_distribution(products),
            category_breakdown: top_counts(
                products
                    .iter()
                    .filter_map(|p| p.primary_categories().first())
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            ),
            top_brands: top_counts(products.iter().map(|p| p.brand.clone())),
            material_distribution: top_counts(
                products
                    .iter()
                    .map(|p| p.material.trim().to_string())
                    .filter(|m| !m.is_empty()),
            ),
        }
    }
}

const PRICE_BUCKETS: &[(&str, f64, f64)] = &[
    ("$0-50", 0.0, 50.0),
    ("$50-100", 50.0, 100.0),
    ("$100-200", 100.0, 200.0),
    ("$200-500", 200.0, 500.0),
    ("$500-1000", 500.0, 1000.0),
    ("$1000+", 1000.0, f64::INFINITY),
];

/// Product counts per price range. Every bucket is reported, including
/// empty ones, in ascending price order.
fn price_distribution(products: &[Product]) -> Vec<CountEntry> {
    PRICE_BUCKETS
        .iter()
        .map(|(label, low, high)| CountEntry {
            name: (*label).to_string(),
            count: products
                .iter()
                .filter(|p| p.price >= *low && p.price < *high)
                .count(),
        })
        .collect()
}

/// Highest counts first; ties resolve alphabetically for stable output.
fn top_counts<I: Iterator<Item = String>>(values: I) -> Vec<CountEntry> {
    values
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(TOP_N)
        .map(|(name, count)| CountEntry { name, count })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
