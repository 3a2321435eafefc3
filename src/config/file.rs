//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[".mdbed.yaml", ".mdbed.yml", "mdbed.yaml", "mdbed.yml"];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/mdbed/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let cwd = std::env::current_dir().ok();
    let candidates = [
        cwd.clone(),
        cwd.as_deref().and_then(find_git_root),
        dirs::config_dir().map(|dir| dir.join("mdbed")),
        dirs::home_dir(),
    ];
    candidates
        .iter()
        .flatten()
        .find_map(|dir| find_config_in_dir(dir))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                (config, Some(path))
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from the defaults override, so a config built
    /// from CLI flags can be layered over a file config.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        if other.matching.preset != defaults.matching.preset {
            self.matching.preset.clone_from(&other.matching.preset);
        }
        if other.matching.threshold.is_some() {
            self.matching.threshold = other.matching.threshold;
        }
        if other.matching.ignore_whitespace {
            self.matching.ignore_whitespace = true;
        }
        if other.matching.assignment != defaults.matching.assignment {
            self.matching.assignment = other.matching.assignment;
        }
        if other.matching.line_detail {
            self.matching.line_detail = true;
        }

        if other.segmentation.policy.is_some() {
            self.segmentation.policy = other.segmentation.policy;
        }
        if other.segmentation.recursive {
            self.segmentation.recursive = true;
        }
        if other.segmentation.filter.is_some() {
            self.segmentation.filter.clone_from(&other.segmentation.filter);
        }

        if other.embedding.provider != defaults.embedding.provider {
            self.embedding.provider = other.embedding.provider;
        }
        if other.embedding.model != defaults.embedding.model {
            self.embedding.model.clone_from(&other.embedding.model);
        }
        if other.embedding.dimension != defaults.embedding.dimension {
            self.embedding.dimension = other.embedding.dimension;
        }
        if other.embedding.endpoint.is_some() {
            self.embedding.endpoint.clone_from(&other.embedding.endpoint);
        }
        if other.embedding.api_key_env.is_some() {
            self.embedding.api_key_env.clone_from(&other.embedding.api_key_env);
        }
        if other.embedding.timeout_secs != defaults.embedding.timeout_secs {
            self.embedding.timeout_secs = other.embedding.timeout_secs;
        }
        if other.embedding.batch_size != defaults.embedding.batch_size {
            self.embedding.batch_size = other.embedding.batch_size;
        }

        if !other.cache.enabled {
            self.cache.enabled = false;
        }
        if other.cache.path.is_some() {
            self.cache.path.clone_from(&other.cache.path);
        }

        if other.output.format != defaults.output.format {
            self.output.format = other.output.format;
        }
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if other.output.include_unchanged {
            self.output.include_unchanged = true;
        }
        if other.output.no_color {
            self.output.no_color = true;
        }

        if other.behavior.fail_on_change {
            self.behavior.fail_on_change = true;
        }
        if other.behavior.quiet {
            self.behavior.quiet = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file with every option and its default.
#[must_use]
pub fn generate_example_config() -> String {
    r"# mdbed configuration
# Place this file at .mdbed.yaml in your project root or ~/.config/mdbed/
# CLI arguments always override file settings.

matching:
  # Preset: strict (0.85), balanced (0.70), permissive (0.55)
  preset: balanced
  # Custom similarity threshold (0.0-1.0), overrides preset; 1.0 disables fuzzy matching
  # threshold: 0.75
  # Treat trailing whitespace and surrounding blank lines as insignificant
  ignore_whitespace: false
  # Assignment: greedy, optimal
  assignment: greedy
  # Report inserted/deleted lines inside modified segments
  line_detail: false

segmentation:
  # Policy: markdown-sections, markdown-blocks, paragraphs, python, rust
  # Detected from the file extension when omitted
  # policy: markdown-sections
  # Descend into subdirectories when a directory is given
  recursive: false
  # Regex matched against file names inside directories (default: markdown files)
  # filter: '\.(md|markdown)$'

embedding:
  # Provider: hash, http, cached-only
  provider: hash
  model: hash-v1
  dimension: 384
  # endpoint: https://api.openai.com/v1/embeddings
  # api_key_env: OPENAI_API_KEY
  timeout_secs: 30
  batch_size: 32

cache:
  enabled: true
  # path: ~/.cache/mdbed/embeddings.json

output:
  # Format: auto, json, summary, table, csv
  format: auto
  # file: report.json
  include_unchanged: false
  no_color: false

behavior:
  # Exit with code 1 if any changes detected
  fail_on_change: false
  quiet: false
"
    .to_string()
}
