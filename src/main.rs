use clap::{Parser, Subcommand};
use furnimatch::Result;
use furnimatch::commands::{inspect_catalog, run_recommend, serve_mcp, show_analytics};
use furnimatch::config::{Config, run_interactive_config, show_config};
use furnimatch::engine::RecommendFilters;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "furnimatch")]
#[command(about = "AI-powered furniture recommendations over a product catalog, served via MCP")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the Ollama connection and engine settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Validate a catalog CSV and show what would be indexed
    Catalog {
        /// Catalog CSV path (defaults to the configured path)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Run a single recommendation query
    Recommend {
        /// Free-text furniture query
        query: String,
        /// Number of results to return
        #[arg(long)]
        top_k: Option<usize>,
        /// Only include products at or above this price
        #[arg(long)]
        min_price: Option<f64>,
        /// Only include products at or below this price
        #[arg(long)]
        max_price: Option<f64>,
        /// Only include products in this category (repeatable, OR-matched)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Only include products with this material
        #[arg(long)]
        material: Option<String>,
        /// Only include products with this color
        #[arg(long)]
        color: Option<String>,
        /// Catalog CSV path (defaults to the configured path)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Show catalog analytics
    Analytics {
        /// Catalog CSV path (defaults to the configured path)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Start the MCP server on stdio
    Serve {
        /// Catalog CSV path (defaults to the configured path)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Catalog { path } => {
            inspect_catalog(&Config::load_default()?, path)?;
        }
        Commands::Recommend {
            query,
            top_k,
            min_price,
            max_price,
            categories,
            material,
            color,
            catalog,
        } => {
            let filters = RecommendFilters {
                min_price,
                max_price,
                categories: (!categories.is_empty()).then_some(categories),
                material,
                color,
            };
            run_recommend(&Config::load_default()?, query, top_k, filters, catalog)?;
        }
        Commands::Analytics { catalog } => {
            show_analytics(&Config::load_default()?, catalog)?;
        }
        Commands::Serve { catalog } => {
            serve_mcp(&Config::load_default()?, catalog).await?;
        }
    }

    Ok(())
}
