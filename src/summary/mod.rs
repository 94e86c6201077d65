#[cfg(test)]
mod tests;

use itertools::Itertools;

use crate::engine::Recommendation;

/// Template-based natural-language summary of a result set.
#[inline]
pub fn generate(results: &[Recommendation], query: &str) -> String {
    if results.is_empty() {
        return "We couldn't find exact matches for your search. \
                Try different keywords or adjust your filters."
            .to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    if results.len() == 1 {
        parts.push(format!("Found 1 great match for '{query}'."));
    } else {
        parts.push(format!(
            "Found {} excellent matches for '{query}'.",
            results.len()
        ));
    }

    let top = &results[0];
    if top.score.final_score > 0.6 {
        parts.push(format!(
            "Our top recommendation is the {} by {}.",
            top.product.title, top.product.brand
        ));
    }

    let materials: Vec<&str> = results
        .iter()
        .take(3)
        .map(|r| r.product.material.as_str())
        .filter(|m| m.len() > 2)
        .unique()
        .take(2)
        .collect();
    if !materials.is_empty() {
        parts.push(format!(
            "These pieces feature {} construction.",
            materials.join(" and ")
        ));
    }

    if let Some(category) = main_category(results) {
        parts.push(format!("Perfect for your {category} needs."));
    }

    parts.join(" ")
}

/// Most common primary category among the leading results.
fn main_category(results: &[Recommendation]) -> Option<String> {
    results
        .iter()
        .take(3)
        .filter_map(|r| r.product.primary_categories().first())
        .map(|c| c.to_lowercase())
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .next()
        .map(|(category, _)| category)
}
