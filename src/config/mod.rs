//! Configuration module for mdbed.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```
//! use mdbed::config::{AppConfig, ConfigPreset, Validatable};
//!
//! let config = AppConfig::builder()
//!     .preset("strict")
//!     .line_detail(true)
//!     .fail_on_change(true)
//!     .build();
//! assert!(config.is_valid());
//!
//! let ci = AppConfig::from_preset(ConfigPreset::CiCd);
//! assert!(ci.behavior.fail_on_change);
//! ```
//!
//! # Configuration File
//!
//! Place a `.mdbed.yaml` file in your project root or `~/.config/mdbed/`:
//!
//! ```yaml
//! matching:
//!   preset: strict
//!   line_detail: true
//! embedding:
//!   provider: http
//!   endpoint: https://api.openai.com/v1/embeddings
//!   model: text-embedding-3-small
//!   dimension: 1536
//!   api_key_env: OPENAI_API_KEY
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::ConfigPreset;
pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, CacheConfig, DiffPaths, EmbeddingConfig,
    MatchingConfig, OutputConfig, SegmentationConfig,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.mdbed.yaml` config files. It can be used by editors for
/// validation and autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
