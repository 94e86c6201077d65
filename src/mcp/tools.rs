//! MCP Tools Implementation
//!
//! Tool definitions and handlers exposing the recommendation engine,
//! catalog analytics, and product lookups to MCP clients.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::catalog::{Product, load_catalog};
use crate::analytics::CatalogAnalytics;
use crate::engine::{Recommendation, RecommendRequest, RecommendationEngine};
use crate::mcp::protocol::{CallToolParams, CallToolResult, Tool, ToolContent};
use crate::mcp::server::ToolHandler;
use crate::summary;
use crate::FurniError;

const DEFAULT_PAGE_LIMIT: usize = 50;
const MAX_PAGE_LIMIT: usize = 100;

fn text_result(text: String, is_error: bool) -> CallToolResult {
    CallToolResult {
        content: vec![ToolContent::Text { text }],
        is_error: Some(is_error),
    }
}

fn json_result(value: &Value) -> Result<CallToolResult> {
    Ok(text_result(serde_json::to_string_pretty(value)?, false))
}

/// Recommendation tool handler
pub struct RecommendHandler {
    engine: Arc<RecommendationEngine>,
}

impl RecommendHandler {
    #[inline]
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self { engine }
    }

    /// Create the recommend_products tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "recommend_products".to_string(),
            description: Some(
                "Get ranked furniture recommendations for a free-text query".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Free-text furniture query"
                    },
                    "top_k": {
                        "type": "integer",
                        "description": "Maximum number of results (default: 5)"
                    },
                    "filters": {
                        "type": "object",
                        "properties": {
                            "min_price": { "type": "number" },
                            "max_price": { "type": "number" },
                            "categories": {
                                "type": "array",
                                "items": { "type": "string" }
                            },
                            "material": { "type": "string" },
                            "color": { "type": "string" }
                        },
                        "additionalProperties": false
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for RecommendHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let request: RecommendRequest =
            match serde_json::from_value(Value::Object(args.into_iter().collect())) {
                Ok(request) => request,
                Err(e) => {
                    return Ok(text_result(format!("Invalid request: {e}"), true));
                }
            };

        debug!(
            "Recommendation request: query='{}', top_k={:?}, filters={:?}",
            request.query, request.top_k, request.filters
        );

        match self.engine.recommend(&request) {
            Ok(results) => {
                let generated_description = summary::generate(&results, &request.query);
                let rows: Vec<Value> = results.iter().map(product_row).collect::<Result<_>>()?;

                json_result(&json!({
                    "products": rows,
                    "generated_description": generated_description,
                    "total_matches": results.len()
                }))
            }
            Err(e @ FurniError::InvalidInput(_)) => {
                Ok(text_result(format!("Invalid request: {e}"), true))
            }
            Err(e) => {
                error!("Recommendation failed: {}", e);
                Ok(text_result(format!("Recommendation error: {e}"), true))
            }
        }
    }
}

/// Product fields plus the score breakdown, as one flat response row.
fn product_row(recommendation: &Recommendation) -> Result<Value> {
    let mut row = serde_json::to_value(&recommendation.product)?;
    if let Some(fields) = row.as_object_mut() {
        let score = &recommendation.score;
        fields.insert("similarity_score".to_string(), json!(score.final_score));
        fields.insert(
            "score_breakdown".to_string(),
            json!({
                "text_similarity": score.text_similarity,
                "category_score": score.category_score,
                "material_score": score.material_score,
                "color_score": score.color_score,
            }),
        );
    }
    Ok(row)
}

/// Catalog analytics tool handler
pub struct AnalyticsHandler {
    engine: Arc<RecommendationEngine>,
}

impl AnalyticsHandler {
    #[inline]
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self { engine }
    }

    /// Create the catalog_analytics tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "catalog_analytics".to_string(),
            description: Some(
                "Catalog statistics: price ranges, categories, brands, materials".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for AnalyticsHandler {
    #[inline]
    async fn handle(&self, _params: CallToolParams) -> Result<CallToolResult> {
        debug!("Computing catalog analytics");

        let index = self.engine.index();
        let products: Vec<Product> = index
            .entries()
            .iter()
            .map(|entry| entry.product.clone())
            .collect();

        let analytics = CatalogAnalytics::compute(&products);
        json_result(&serde_json::to_value(analytics)?)
    }
}

/// Paginated product listing tool handler
pub struct ListProductsHandler {
    engine: Arc<RecommendationEngine>,
}

impl ListProductsHandler {
    #[inline]
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self { engine }
    }

    /// Create the list_products tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "list_products".to_string(),
            description: Some("List catalog products with pagination".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "offset": {
                        "type": "integer",
                        "description": "Number of products to skip (default: 0)"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum products to return (default: 50, max: 100)"
                    }
                },
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ListProductsHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let offset = args
            .get("offset")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;
        let limit = args
            .get("limit")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_PAGE_LIMIT as u64)
            .clamp(1, MAX_PAGE_LIMIT as u64) as usize;

        let index = self.engine.index();
        let products: Vec<&Product> = index
            .entries()
            .iter()
            .map(|entry| &entry.product)
            .skip(offset)
            .take(limit)
            .collect();

        json_result(&json!({
            "total": index.len(),
            "offset": offset,
            "limit": limit,
            "products": products
        }))
    }
}

/// Single product lookup tool handler
pub struct GetProductHandler {
    engine: Arc<RecommendationEngine>,
}

impl GetProductHandler {
    #[inline]
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self { engine }
    }

    /// Create the get_product tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "get_product".to_string(),
            description: Some("Fetch one product by its id".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "product_id": {
                        "type": "string",
                        "description": "Unique product identifier"
                    }
                },
                "required": ["product_id"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for GetProductHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> Result<CallToolResult> {
        let args = params.arguments.unwrap_or_default();

        let Some(product_id) = args.get("product_id").and_then(Value::as_str) else {
            return Ok(text_result(
                "Missing required parameter: product_id".to_string(),
                true,
            ));
        };

        let index = self.engine.index();
        match index.get(product_id) {
            Some(entry) => json_result(&serde_json::to_value(&entry.product)?),
            None => Ok(text_result(
                format!("Product with id '{product_id}' not found"),
                true,
            )),
        }
    }
}

/// Catalog reload tool handler
pub struct ReloadCatalogHandler {
    engine: Arc<RecommendationEngine>,
    catalog_path: PathBuf,
}

impl ReloadCatalogHandler {
    #[inline]
    pub fn new(engine: Arc<RecommendationEngine>, catalog_path: PathBuf) -> Self {
        Self {
            engine,
            catalog_path,
        }
    }

    /// Create the reload_catalog tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: "reload_catalog".to_string(),
            description: Some(
                "Re-read the catalog CSV and rebuild the index atomically".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ReloadCatalogHandler {
    #[inline]
    async fn handle(&self, _params: CallToolParams) -> Result<CallToolResult> {
        info!("Reloading catalog from {}", self.catalog_path.display());

        let report = match load_catalog(&self.catalog_path) {
            Ok(report) => report,
            Err(e) => {
                error!("Catalog reload failed: {}", e);
                return Ok(text_result(format!("Catalog reload failed: {e}"), true));
            }
        };

        let duplicates_removed = report.duplicates_removed;
        let load_rejected = report.rejected.len();

        match self.engine.rebuild(report.products) {
            Ok(build_report) => json_result(&json!({
                "indexed": build_report.indexed,
                "rejected": build_report.rejected.len() + load_rejected,
                "duplicates_removed": duplicates_removed
            })),
            Err(e) => {
                error!("Index rebuild failed: {}", e);
                Ok(text_result(format!("Index rebuild failed: {e}"), true))
            }
        }
    }
}
