use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::analytics::CatalogAnalytics;
use crate::catalog::{CatalogReport, load_catalog};
use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::engine::{
    RecommendFilters, RecommendRequest, RecommendationEngine, Recommendation, Vocabulary,
};
use crate::mcp::McpServer;
use crate::mcp::tools::{
    AnalyticsHandler, GetProductHandler, ListProductsHandler, RecommendHandler,
    ReloadCatalogHandler,
};
use crate::summary;

/// Validate a catalog file and report what would be indexed
#[inline]
pub fn inspect_catalog(config: &Config, path_override: Option<PathBuf>) -> Result<()> {
    let path = resolve_catalog_path(config, path_override);
    let report = load_catalog(&path)?;

    println!("Catalog: {}", style(path.display()).cyan());
    println!("  Usable products: {}", style(report.products.len()).green());
    println!("  Duplicates removed: {}", report.duplicates_removed);
    println!("  Rejected rows: {}", report.rejected.len());

    for rejected in &report.rejected {
        println!(
            "    {} line {} (id '{}'): {}",
            style("!").yellow(),
            rejected.line,
            rejected.id,
            rejected.reason
        );
    }

    if let Some(product) = report.products.first() {
        println!();
        println!("First product:");
        println!("  {} — {} (${:.2})", product.id, product.title, product.price);
        if !product.categories.is_empty() {
            println!("  Categories: {}", product.categories.join(", "));
        }
    }

    Ok(())
}

/// Run one recommendation query from the command line
#[inline]
pub fn run_recommend(
    config: &Config,
    query: String,
    top_k: Option<usize>,
    filters: RecommendFilters,
    catalog_override: Option<PathBuf>,
) -> Result<()> {
    let catalog_path = resolve_catalog_path(config, catalog_override);
    let engine = build_engine(config, &catalog_path)?;

    let filters =
        (filters != RecommendFilters::default()).then_some(filters);
    let request = RecommendRequest {
        query,
        top_k,
        filters,
    };

    let results = engine.recommend(&request)?;

    if results.is_empty() {
        println!("{}", style("No matching products.").yellow());
    }

    for (rank, result) in results.iter().enumerate() {
        print_recommendation(rank + 1, result);
    }

    println!();
    println!("{}", style(summary::generate(&results, &request.query)).dim());

    Ok(())
}

/// Print catalog analytics without building embeddings
#[inline]
pub fn show_analytics(config: &Config, catalog_override: Option<PathBuf>) -> Result<()> {
    let path = resolve_catalog_path(config, catalog_override);
    let report = load_catalog(&path)?;
    let analytics = CatalogAnalytics::compute(&report.products);

    println!("{}", style("Catalog Analytics").bold().cyan());
    println!("  Total products: {}", analytics.total_products);
    println!("  Average price: ${:.2}", analytics.avg_price);

    println!();
    println!("{}", style("Price distribution:").bold());
    for bucket in &analytics.price_distribution {
        println!("  {:<12} {}", bucket.name, bucket.count);
    }

    println!();
    println!("{}", style("Top categories:").bold());
    for entry in &analytics.category_breakdown {
        println!("  {:<30} {}", entry.name, entry.count);
    }

    println!();
    println!("{}", style("Top brands:").bold());
    for entry in &analytics.top_brands {
        println!("  {:<30} {}", entry.name, entry.count);
    }

    println!();
    println!("{}", style("Materials:").bold());
    for entry in &analytics.material_distribution {
        println!("  {:<30} {}", entry.name, entry.count);
    }

    Ok(())
}

/// Start the MCP server on stdio
#[inline]
pub async fn serve_mcp(config: &Config, catalog_override: Option<PathBuf>) -> Result<()> {
    let catalog_path = resolve_catalog_path(config, catalog_override);
    let engine = build_engine(config, &catalog_path)?;

    let server = Arc::new(McpServer::new(
        "furnimatch".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    ));

    server
        .register_tool(
            RecommendHandler::tool_definition(),
            RecommendHandler::new(Arc::clone(&engine)),
        )
        .await;
    server
        .register_tool(
            AnalyticsHandler::tool_definition(),
            AnalyticsHandler::new(Arc::clone(&engine)),
        )
        .await;
    server
        .register_tool(
            ListProductsHandler::tool_definition(),
            ListProductsHandler::new(Arc::clone(&engine)),
        )
        .await;
    server
        .register_tool(
            GetProductHandler::tool_definition(),
            GetProductHandler::new(Arc::clone(&engine)),
        )
        .await;
    server
        .register_tool(
            ReloadCatalogHandler::tool_definition(),
            ReloadCatalogHandler::new(Arc::clone(&engine), catalog_path),
        )
        .await;

    server.serve_stdio().await
}

/// Load the catalog, check the embedding backend, and build the engine.
fn build_engine(config: &Config, catalog_path: &Path) -> Result<Arc<RecommendationEngine>> {
    let client = OllamaClient::new(config).context("Failed to initialize Ollama client")?;
    client
        .health_check()
        .context("Embedding backend is unavailable")?;

    let report = load_catalog(catalog_path)?;
    warn_on_rejects(&report);

    let vocabulary = load_vocabulary(config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!(
        "Embedding {} products with {}...",
        report.products.len(),
        config.ollama.model
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let (engine, build_report) = RecommendationEngine::new(
        report.products,
        vocabulary,
        config.engine.clone(),
        Arc::new(client),
    )?;

    spinner.finish_and_clear();
    info!(
        "Engine ready: {} products indexed, {} rejected",
        build_report.indexed,
        build_report.rejected.len()
    );

    Ok(Arc::new(engine))
}

fn load_vocabulary(config: &Config) -> Result<Vocabulary> {
    match config.keywords_file_path() {
        Some(path) => Vocabulary::load(path),
        None => Ok(Vocabulary::default()),
    }
}

fn resolve_catalog_path(config: &Config, path_override: Option<PathBuf>) -> PathBuf {
    path_override.unwrap_or_else(|| config.catalog.path.clone())
}

fn warn_on_rejects(report: &CatalogReport) {
    for rejected in &report.rejected {
        warn!(
            "Catalog line {} (id '{}') skipped: {}",
            rejected.line, rejected.id, rejected.reason
        );
    }
}

fn print_recommendation(rank: usize, result: &Recommendation) {
    let product = &result.product;
    println!(
        "{} {} {} (${:.2})",
        style(format!("{rank}.")).bold(),
        style(&product.title).bold().cyan(),
        style(format!("by {}", product.brand)).dim(),
        product.price
    );
    println!(
        "   score {:.3} (text {:.3}, category {:.2}, material {:.2}, color {:.2})",
        result.score.final_score,
        result.score.text_similarity,
        result.score.category_score,
        result.score.material_score,
        result.score.color_score
    );
    if !product.categories.is_empty() {
        println!("   {}", style(product.categories.join(" / ")).dim());
    }
}
