//! Named configuration presets.

use super::types::{AppConfig, BehaviorConfig, MatchingConfig, OutputConfig};
use crate::reports::ReportFormat;

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigPreset {
    /// Balanced matching, human-readable output
    Default,
    /// JSON output, fail on any change, no color
    CiCd,
    /// Only near-verbatim edits count as the same segment
    Strict,
    /// Heavier rewrites still match, unchanged segments shown
    Permissive,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::CiCd => "ci-cd",
            Self::Strict => "strict",
            Self::Permissive => "permissive",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "balanced" => Some(Self::Default),
            "ci-cd" | "ci" | "pipeline" => Some(Self::CiCd),
            "strict" => Some(Self::Strict),
            "permissive" | "loose" => Some(Self::Permissive),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::CiCd => Self {
                output: OutputConfig {
                    format: ReportFormat::Json,
                    no_color: true,
                    ..OutputConfig::default()
                },
                behavior: BehaviorConfig {
                    fail_on_change: true,
                    quiet: true,
                },
                ..Self::default()
            },
            ConfigPreset::Strict => Self {
                matching: MatchingConfig {
                    preset: "strict".to_string(),
                    ..MatchingConfig::default()
                },
                ..Self::default()
            },
            ConfigPreset::Permissive => Self {
                matching: MatchingConfig {
                    preset: "permissive".to_string(),
                    ignore_whitespace: true,
                    ..MatchingConfig::default()
                },
                output: OutputConfig {
                    include_unchanged: true,
                    ..OutputConfig::default()
                },
                ..Self::default()
            },
        }
    }
}
