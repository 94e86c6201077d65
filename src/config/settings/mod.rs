
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::embeddings::ollama::DEFAULT_EMBEDDING_DIMENSION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OllamaConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub batch_size: u32,
    pub embedding_dimension: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            port: 11434,
            model: "all-minilm:latest".to_string(),
            batch_size: 16,
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// CSV file holding the product catalog.
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/furniture_dataset.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum blended score a product must reach to appear in results.
    /// 0.45 is the stricter of the two defaults this engine has shipped
    /// with; 0.3 trades precision for recall and remains a valid setting.
    pub min_similarity: f32,
    /// Result count used when a request does not specify `top_k`.
    pub default_top_k: usize,
    /// Hard upper bound on `top_k` accepted from a request.
    pub max_results: usize,
    pub weights: BlendWeights,
    /// Optional keyword-expansion table file. When unset, `keywords.toml`
    /// next to the config file is used if present, else built-in tables.
    pub keywords_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.45,
            default_top_k: 5,
            max_results: 10,
            weights: BlendWeights::default(),
            keywords_path: None,
        }
    }
}

/// Blend weights for the multi-factor score. Must sum to 1.
/// The default split keeps text similarity dominant; a 0.70/0.15/0.08/0.07
/// split that leans harder on the keyword facets is also in use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlendWeights {
    pub text: f32,
    pub category: f32,
    pub material: f32,
    pub color: f32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            text: 0.75,
            category: 0.15,
            material: 0.05,
            color: 0.05,
        }
    }
}

impl BlendWeights {
    fn sum(&self) -> f32 {
        self.text + self.category + self.material + self.color
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid batch size: {0} (must be between 1 and 1000)")]
    InvalidBatchSize(u32),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid embedding dimension: {0} (must be between 64 and 4096)")]
    InvalidEmbeddingDimension(u32),
    #[error("Invalid minimum similarity: {0} (must be between 0 and 1)")]
    InvalidMinSimilarity(f32),
    #[error("Invalid default top_k: {0} (must be at least 1)")]
    InvalidDefaultTopK(usize),
    #[error("Max results ({0}) must be at least default top_k ({1})")]
    MaxResultsTooSmall(usize, usize),
    #[error("Invalid {0} weight: {1} (must be between 0 and 1)")]
    InvalidWeight(&'static str, f32),
    #[error("Blend weights sum to {0}, expected 1")]
    UnnormalizedWeights(f32),
    #[error("Catalog path cannot be empty")]
    EmptyCatalogPath,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    /// Load from the platform config directory (`furnimatch` subdirectory).
    #[inline]
    pub fn load_default() -> Result<Self> {
        Self::load(default_config_dir()?)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                self.base_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ollama.validate()?;
        self.engine.validate()?;

        if self.catalog.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyCatalogPath);
        }

        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.base_dir.join("config.toml")
    }

    /// Keyword-expansion table file, when one exists.
    #[inline]
    pub fn keywords_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.engine.keywords_path {
            return Some(path.clone());
        }

        let default_path = self.base_dir.join("keywords.toml");
        default_path.exists().then_some(default_path)
    }
}

impl OllamaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        self.ollama_url()?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        if !(64..=4096).contains(&self.embedding_dimension) {
            return Err(ConfigError::InvalidEmbeddingDimension(
                self.embedding_dimension,
            ));
        }

        Ok(())
    }

    pub fn ollama_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_similarity) || !self.min_similarity.is_finite() {
            return Err(ConfigError::InvalidMinSimilarity(self.min_similarity));
        }

        if self.default_top_k == 0 {
            return Err(ConfigError::InvalidDefaultTopK(self.default_top_k));
        }

        if self.max_results < self.default_top_k {
            return Err(ConfigError::MaxResultsTooSmall(
                self.max_results,
                self.default_top_k,
            ));
        }

        let weights = &self.weights;
        for (name, value) in [
            ("text", weights.text),
            ("category", weights.category),
            ("material", weights.material),
            ("color", weights.color),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ConfigError::InvalidWeight(name, value));
            }
        }

        let sum = weights.sum();
        if (sum - 1.0).abs() > 1e-3 {
            return Err(ConfigError::UnnormalizedWeights(sum));
        }

        Ok(())
    }
}

/// Platform config directory for the application.
#[inline]
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine platform config directory",
        )
    })?;
    Ok(base.join("furnimatch"))
}
