use thiserror::Error;

pub type Result<T, E = FurniError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum FurniError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod analytics;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod embeddings;
pub mod engine;
pub mod mcp;
pub mod summary;
