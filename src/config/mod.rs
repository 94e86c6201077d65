// Configuration management module
// TOML settings, validation, and the interactive setup flow

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    BlendWeights, CatalogConfig, Config, ConfigError, EngineConfig, OllamaConfig,
    default_config_dir,
};
