
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::{FurniError, Result};

/// Number of leading categories treated as the product's primary ones.
pub const PRIMARY_CATEGORY_COUNT: usize = 3;

/// One validated catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub price: f64,
    pub categories: Vec<String>,
    pub material: String,
    pub color: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_of_origin: Option<String>,
}

impl Product {
    /// The most relevant categories, in catalog order.
    #[inline]
    pub fn primary_categories(&self) -> &[String] {
        let end = self.categories.len().min(PRIMARY_CATEGORY_COUNT);
        &self.categories[..end]
    }
}

/// A catalog row that could not be turned into a usable `Product`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// 1-based line number in the CSV file (header is line 1).
    pub line: usize,
    pub id: String,
    pub reason: String,
}

/// Outcome of a catalog load: usable products plus what was dropped.
#[derive(Debug, Clone, Default)]
pub struct CatalogReport {
    pub products: Vec<Product>,
    pub rejected: Vec<RejectedRecord>,
    pub duplicates_removed: usize,
}

/// Raw CSV row before cleaning. Every field is optional at this stage;
/// validation happens after coercion.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    uniq_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    categories: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    images: String,
    #[serde(default)]
    material: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    manufacturer: String,
    #[serde(default)]
    country_of_origin: String,
}

/// Load and clean the product catalog from a CSV file.
///
/// Rows with an unusable price are skipped and reported; duplicate ids keep
/// the first occurrence. The load only fails when the file cannot be read
/// or no usable rows remain.
#[inline]
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<CatalogReport> {
    let path = path.as_ref();
    info!("Loading catalog from {}", path.display());

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut report = CatalogReport::default();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (index, row) in reader.deserialize::<RawRecord>().enumerate() {
        // Header occupies line 1
        let line = index + 2;

        let raw = match row {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping malformed catalog row at line {}: {}", line, e);
                report.rejected.push(RejectedRecord {
                    line,
                    id: String::new(),
                    reason: format!("malformed row: {e}"),
                });
                continue;
            }
        };

        let price = match clean_price(&raw.price) {
            Ok(price) => price,
            Err(reason) => {
                warn!(
                    "Skipping catalog row at line {} (id '{}'): {}",
                    line, raw.uniq_id, reason
                );
                report.rejected.push(RejectedRecord {
                    line,
                    id: raw.uniq_id,
                    reason,
                });
                continue;
            }
        };

        if !seen_ids.insert(raw.uniq_id.clone()) {
            report.duplicates_removed += 1;
            debug!("Dropping duplicate product id '{}' at line {}", raw.uniq_id, line);
            continue;
        }

        let brand = if raw.brand.trim().is_empty() {
            "Unknown".to_string()
        } else {
            raw.brand.trim().to_string()
        };

        report.products.push(Product {
            id: raw.uniq_id.trim().to_string(),
            title: raw.title.trim().to_string(),
            brand,
            description: raw.description.trim().to_string(),
            price,
            categories: parse_list_string(&raw.categories),
            material: raw.material.trim().to_lowercase(),
            color: raw.color.trim().to_lowercase(),
            image_url: extract_first_image(&raw.images),
            manufacturer: non_empty(raw.manufacturer),
            country_of_origin: non_empty(raw.country_of_origin),
        });
    }

    if report.products.is_empty() {
        return Err(FurniError::Catalog(format!(
            "No usable products in {} ({} rows rejected)",
            path.display(),
            report.rejected.len()
        )));
    }

    info!(
        "Loaded {} unique products ({} duplicates removed, {} rows rejected)",
        report.products.len(),
        report.duplicates_removed,
        report.rejected.len()
    );

    Ok(report)
}

/// Parse a price that may carry currency formatting, e.g. "$1,299.99".
fn clean_price(raw: &str) -> Result<f64, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();

    if cleaned.is_empty() {
        return Err("missing price".to_string());
    }

    let price: f64 = cleaned
        .parse()
        .map_err(|_| format!("unparseable price '{raw}'"))?;

    if !price.is_finite() {
        return Err(format!("non-finite price '{raw}'"));
    }

    if price < 0.0 {
        return Err(format!("negative price '{raw}'"));
    }

    Ok(price)
}

/// Parse a list-ish CSV cell such as `['Sofas', 'Living Room']` or a plain
/// comma-separated string into its entries.
fn parse_list_string(raw: &str) -> Vec<String> {
    raw.chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"'))
        .collect::<String>()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// First usable image URL from the `images` cell, or empty.
fn extract_first_image(raw: &str) -> String {
    parse_list_string(raw)
        .into_iter()
        .find(|entry| entry.starts_with("http://") || entry.starts_with("https://"))
        .unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
