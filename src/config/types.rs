//! Configuration types for mdbed operations.

use crate::embedding::{ProviderKind, DEFAULT_BATCH_SIZE, HASH_MODEL_NAME};
use crate::matching::{AssignmentMethod, MatchConfig};
use crate::reports::ReportFormat;
use crate::segment::SegmentationPolicy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI flags are layered over file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Matching configuration (threshold, presets, assignment)
    pub matching: MatchingConfig,
    /// How documents are cut into segments
    pub segmentation: SegmentationConfig,
    /// Embedding provider selection
    pub embedding: EmbeddingConfig,
    /// Persisted embedding cache
    pub cache: CacheConfig,
    /// Output configuration (format, file, colors)
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the matching preset.
    pub fn preset(mut self, preset: impl Into<String>) -> Self {
        self.config.matching.preset = preset.into();
        self
    }

    /// Set an explicit similarity threshold.
    pub const fn threshold(mut self, threshold: f64) -> Self {
        self.config.matching.threshold = Some(threshold);
        self
    }

    pub const fn ignore_whitespace(mut self, ignore: bool) -> Self {
        self.config.matching.ignore_whitespace = ignore;
        self
    }

    pub const fn assignment(mut self, method: AssignmentMethod) -> Self {
        self.config.matching.assignment = method;
        self
    }

    pub const fn line_detail(mut self, enabled: bool) -> Self {
        self.config.matching.line_detail = enabled;
        self
    }

    /// Force a segmentation policy instead of detecting it from the file name.
    pub const fn policy(mut self, policy: SegmentationPolicy) -> Self {
        self.config.segmentation.policy = Some(policy);
        self
    }

    /// Walk directory inputs recursively.
    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.config.segmentation.recursive = recursive;
        self
    }

    pub fn name_filter(mut self, filter: Option<String>) -> Self {
        self.config.segmentation.filter = filter;
        self
    }

    pub const fn provider(mut self, provider: ProviderKind) -> Self {
        self.config.embedding.provider = provider;
        self
    }

    pub const fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    pub fn cache_path(mut self, path: Option<PathBuf>) -> Self {
        self.config.cache.path = path;
        self
    }

    /// Set output format.
    pub const fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    pub const fn include_unchanged(mut self, include: bool) -> Self {
        self.config.output.include_unchanged = include;
        self
    }

    /// Disable colored output.
    pub const fn no_color(mut self, no_color: bool) -> Self {
        self.config.output.no_color = no_color;
        self
    }

    /// Exit with code 1 when the documents differ.
    pub const fn fail_on_change(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_change = fail;
        self
    }

    /// Suppress non-essential output.
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

/// Input paths for a diff operation.
#[derive(Debug, Clone)]
pub struct DiffPaths {
    /// Path to the old document
    pub old: PathBuf,
    /// Path to the new document
    pub new: PathBuf,
}

// ============================================================================
// Sub-configuration Types
// ============================================================================

/// Matching configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MatchingConfig {
    /// Threshold preset: strict (0.85), balanced (0.70), permissive (0.55)
    pub preset: String,
    /// Custom similarity threshold (overrides preset)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0.0, max = 1.0))]
    pub threshold: Option<f64>,
    /// Treat segments that differ only in trailing whitespace or blank
    /// lines as identical
    pub ignore_whitespace: bool,
    /// Commit strategy for fuzzy matches
    pub assignment: AssignmentMethod,
    /// Attach line-level changes to modified segments
    pub line_detail: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            preset: "balanced".to_string(),
            threshold: None,
            ignore_whitespace: false,
            assignment: AssignmentMethod::Greedy,
            line_detail: false,
        }
    }
}

impl MatchingConfig {
    /// Resolve the preset and overrides into a [`MatchConfig`].
    #[must_use]
    pub fn to_match_config(&self) -> MatchConfig {
        let mut config = MatchConfig::from_preset(&self.preset).unwrap_or_else(|| {
            tracing::warn!(
                "Unknown matching preset '{}', using 'balanced'. Valid: strict, balanced, permissive",
                self.preset
            );
            MatchConfig::balanced()
        });

        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }

        config
            .with_ignore_whitespace(self.ignore_whitespace)
            .with_assignment(self.assignment)
    }
}

/// Segmentation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Segmentation policy; detected from the file extension when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<SegmentationPolicy>,
    /// Descend into subdirectories of directory inputs
    pub recursive: bool,
    /// Regex matched against file names found in directory inputs
    /// (default: markdown extensions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider backend
    pub provider: ProviderKind,
    /// Model name; part of the persisted cache identity
    pub model: String,
    /// Vector dimension
    #[schemars(range(min = 1))]
    pub dimension: usize,
    /// Endpoint URL for the http provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Texts per provider batch
    #[schemars(range(min = 1))]
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Hash,
            model: HASH_MODEL_NAME.to_string(),
            dimension: 384,
            endpoint: None,
            api_key_env: None,
            timeout_secs: 30,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Persisted embedding cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CacheConfig {
    /// Load and save embeddings between runs
    pub enabled: bool,
    /// Cache file (defaults to the user cache directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl CacheConfig {
    /// Configured path, or the default location under the user cache directory.
    #[must_use]
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(crate::embedding::CacheStore::default_path)
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format
    pub format: ReportFormat,
    /// Output file path (None for stdout)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Show unchanged segments in summary and table output
    pub include_unchanged: bool,
    /// Disable colored output
    pub no_color: bool,
}

/// Behavior flags for diff operations
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Exit with code 1 if any changes detected
    pub fail_on_change: bool,
    /// Suppress non-essential output
    pub quiet: bool,
}
