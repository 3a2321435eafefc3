//! Configuration validation for mdbed.

use super::types::{
    AppConfig, BehaviorConfig, CacheConfig, EmbeddingConfig, MatchingConfig, OutputConfig,
    SegmentationConfig,
};
use crate::embedding::ProviderKind;
use crate::matching::PRESET_NAMES;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.matching.validate());
        errors.extend(self.segmentation.validate());
        errors.extend(self.embedding.validate());
        errors.extend(self.cache.validate());
        errors.extend(self.output.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for MatchingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !PRESET_NAMES.contains(&self.preset.to_lowercase().as_str()) {
            errors.push(ConfigError::new(
                "matching.preset",
                format!(
                    "Invalid preset '{}'. Valid options: {}",
                    self.preset,
                    PRESET_NAMES.join(", ")
                ),
            ));
        }

        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                errors.push(ConfigError::new(
                    "matching.threshold",
                    format!("Threshold must be between 0.0 and 1.0, got {threshold}"),
                ));
            }
        }

        errors
    }
}

impl Validatable for SegmentationConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(filter) = &self.filter {
            if let Err(e) = regex::Regex::new(filter) {
                errors.push(ConfigError::new(
                    "segmentation.filter",
                    format!("Invalid file name pattern '{filter}': {e}"),
                ));
            }
        }
        errors
    }
}

impl Validatable for EmbeddingConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.dimension == 0 {
            errors.push(ConfigError::new(
                "embedding.dimension",
                "Dimension must be at least 1",
            ));
        }
        if self.batch_size == 0 {
            errors.push(ConfigError::new(
                "embedding.batch_size",
                "Batch size must be at least 1",
            ));
        }
        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "embedding.timeout_secs",
                "Timeout must be at least 1 second",
            ));
        }
        if self.model.trim().is_empty() {
            errors.push(ConfigError::new("embedding.model", "Model name must not be empty"));
        }
        if self.provider == ProviderKind::Http && self.endpoint.is_none() {
            errors.push(ConfigError::new(
                "embedding.endpoint",
                "An endpoint is required for the http provider",
            ));
        }

        errors
    }
}

impl Validatable for CacheConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref path) = self.path {
            if path.is_dir() {
                errors.push(ConfigError::new(
                    "cache.path",
                    format!("Cache path is a directory: {}", path.display()),
                ));
            }
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        // Validate output file path if specified
        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError::new(
                        "output.file",
                        format!("Parent directory does not exist: {}", parent.display()),
                    ));
                }
            }
        }

        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        Vec::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
