
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// Keyword-expansion tables for the category, material, and color facets.
///
/// Each table maps a canonical family ("sofa", "wood", "blue") to its
/// variant terms. A product matching any variant of a family is considered
/// to carry the whole family's vocabulary, so a "Velvet Sofa" also answers
/// for "couch" and a "navy" product also answers for "blue". Tables can be
/// tuned through a `keywords.toml` file without touching scoring code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    categories: BTreeMap<String, Vec<String>>,
    materials: BTreeMap<String, Vec<String>>,
    colors: BTreeMap<String, Vec<String>>,
}

/// Per-table overrides parsed from `keywords.toml`. Keys replace the
/// built-in family of the same name; unknown keys add new families.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct VocabularyOverrides {
    categories: BTreeMap<String, Vec<String>>,
    materials: BTreeMap<String, Vec<String>>,
    colors: BTreeMap<String, Vec<String>>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            categories: table(&[
                ("chair", &["chair", "seat", "stool", "seating"]),
                ("table", &["table", "desk", "console", "stand"]),
                ("bed", &["bed", "mattress", "bedroom", "headboard", "frame"]),
                ("sofa", &["sofa", "couch", "loveseat", "sectional", "futon"]),
                (
                    "storage",
                    &[
                        "storage", "cabinet", "shelf", "shelving", "organizer", "rack", "drawer",
                        "dresser", "chest",
                    ],
                ),
                ("outdoor", &["outdoor", "patio", "garden", "deck"]),
                ("office", &["office", "desk", "workspace", "workstation"]),
                ("kitchen", &["kitchen", "dining", "pantry"]),
                (
                    "lighting",
                    &["lamp", "light", "lighting", "fixture", "chandelier", "sconce"],
                ),
                ("bathroom", &["bathroom", "bath", "shower", "vanity", "toilet"]),
                ("living", &["living", "living room", "lounge", "family"]),
                ("bookshelf", &["bookshelf", "bookcase", "shelving"]),
                ("nightstand", &["nightstand", "bedside", "night table"]),
                ("ottoman", &["ottoman", "footstool", "pouf"]),
                ("bench", &["bench"]),
                ("wardrobe", &["wardrobe", "armoire", "closet"]),
                ("mirror", &["mirror", "wall mirror"]),
                ("rug", &["rug", "carpet", "mat"]),
            ]),
            materials: table(&[
                ("wood", &["wood", "wooden", "oak", "pine", "walnut", "mahogany", "teak"]),
                ("metal", &["metal", "steel", "iron", "aluminum", "brass"]),
                ("plastic", &["plastic", "acrylic", "resin"]),
                ("fabric", &["fabric", "upholstered", "textile", "linen", "velvet"]),
                ("leather", &["leather", "faux leather", "genuine leather"]),
                ("glass", &["glass", "tempered glass"]),
                ("rattan", &["rattan", "wicker", "bamboo", "cane"]),
                ("stone", &["stone", "marble", "concrete", "granite"]),
                ("foam", &["foam", "cushion", "padded"]),
            ]),
            colors: table(&[
                ("black", &["black", "charcoal"]),
                ("white", &["white", "ivory", "cream"]),
                ("brown", &["brown", "tan", "beige", "taupe"]),
                ("gray", &["gray", "grey", "slate"]),
                ("blue", &["blue", "navy", "indigo", "teal"]),
                ("red", &["red", "burgundy", "maroon", "crimson"]),
                ("green", &["green", "olive", "sage", "emerald"]),
                ("yellow", &["yellow", "gold", "mustard"]),
                ("orange", &["orange", "rust", "coral"]),
                ("pink", &["pink", "rose", "blush"]),
                ("purple", &["purple", "lavender", "plum"]),
                ("silver", &["silver", "bronze", "copper"]),
            ]),
        }
    }
}

impl Vocabulary {
    /// Built-in tables with per-family overrides from a TOML file applied.
    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read keyword tables: {}", path.display()))?;
        let overrides: VocabularyOverrides = toml::from_str(&content)
            .with_context(|| format!("Failed to parse keyword tables: {}", path.display()))?;

        let mut vocabulary = Self::default();
        for (family, variants) in overrides.categories {
            vocabulary.categories.insert(family, lowercase_all(variants));
        }
        for (family, variants) in overrides.materials {
            vocabulary.materials.insert(family, lowercase_all(variants));
        }
        for (family, variants) in overrides.colors {
            vocabulary.colors.insert(family, lowercase_all(variants));
        }

        info!(
            "Loaded keyword tables from {} ({} categories, {} materials, {} colors)",
            path.display(),
            vocabulary.categories.len(),
            vocabulary.materials.len(),
            vocabulary.colors.len()
        );

        Ok(vocabulary)
    }

    /// Expanded category vocabulary carried by the given product texts.
    #[inline]
    pub fn category_terms(&self, haystacks: &[&str]) -> BTreeSet<String> {
        expand(&self.categories, haystacks)
    }

    /// Expanded material vocabulary carried by the given product texts.
    #[inline]
    pub fn material_terms(&self, haystacks: &[&str]) -> BTreeSet<String> {
        expand(&self.materials, haystacks)
    }

    /// Expanded color vocabulary carried by the given product texts.
    #[inline]
    pub fn color_terms(&self, haystacks: &[&str]) -> BTreeSet<String> {
        expand(&self.colors, haystacks)
    }
}

/// Families whose any variant occurs in the haystacks contribute all their
/// variant words to the result. Single-word variants match on whole words
/// (with plural-tolerant stemming, so "Sofas" answers for "sofa");
/// multi-word variants match as phrases.
fn expand(table: &BTreeMap<String, Vec<String>>, haystacks: &[&str]) -> BTreeSet<String> {
    let joined = haystacks.join(" ").to_lowercase();
    let mut words: HashSet<String> = HashSet::new();
    for word in joined
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        words.insert(word.to_string());
        if let Some(stem) = word.strip_suffix('s') {
            words.insert(stem.to_string());
        }
    }

    let mut terms = BTreeSet::new();

    for variants in table.values() {
        let matched = variants.iter().any(|variant| {
            if variant.contains(' ') {
                joined.contains(variant.as_str())
            } else {
                words.contains(variant.as_str())
            }
        });

        if matched {
            for variant in variants {
                for word in variant.split_whitespace() {
                    terms.insert(word.to_string());
                }
            }
        }
    }

    terms
}

fn table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(family, variants)| {
            (
                (*family).to_string(),
                variants.iter().map(|v| (*v).to_string()).collect(),
            )
        })
        .collect()
}

fn lowercase_all(variants: Vec<String>) -> Vec<String> {
    variants
        .into_iter()
        .map(|variant| variant.trim().to_lowercase())
        .collect()
}
