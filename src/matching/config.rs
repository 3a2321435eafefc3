//! Matching configuration and presets.

use crate::error::{MdbedError, Result};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default similarity threshold (the `balanced` preset).
pub const DEFAULT_THRESHOLD: f64 = 0.70;

/// Preset names accepted by [`MatchConfig::from_preset`].
pub const PRESET_NAMES: [&str; 3] = ["strict", "balanced", "permissive"];

/// How the similarity pass commits candidate pairs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentMethod {
    /// Highest similarity first with a fixed tie-break (reference behaviour)
    #[default]
    Greedy,
    /// Maximum total similarity (Hungarian algorithm)
    Optimal,
}

impl std::fmt::Display for AssignmentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Greedy => write!(f, "greedy"),
            Self::Optimal => write!(f, "optimal"),
        }
    }
}

/// Configuration for the similarity matcher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Minimum cosine similarity for a fuzzy match, in [0, 1]
    pub threshold: f64,
    /// Fingerprint with whitespace normalization
    pub ignore_whitespace: bool,
    /// Commit strategy for the similarity pass
    pub assignment: AssignmentMethod,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::balanced()
    }
}

impl MatchConfig {
    /// Only near-verbatim edits match.
    #[must_use]
    pub const fn strict() -> Self {
        Self::with_base_threshold(0.85)
    }

    /// Default trade-off.
    #[must_use]
    pub const fn balanced() -> Self {
        Self::with_base_threshold(DEFAULT_THRESHOLD)
    }

    /// Heavier rewrites still count as the same segment.
    #[must_use]
    pub const fn permissive() -> Self {
        Self::with_base_threshold(0.55)
    }

    /// Exact fingerprint matching only; the provider is never called.
    #[must_use]
    pub const fn exact_only() -> Self {
        Self::with_base_threshold(1.0)
    }

    const fn with_base_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ignore_whitespace: false,
            assignment: AssignmentMethod::Greedy,
        }
    }

    /// Look up a preset by name.
    #[must_use]
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "strict" => Some(Self::strict()),
            "balanced" => Some(Self::balanced()),
            "permissive" => Some(Self::permissive()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }

    #[must_use]
    pub const fn with_assignment(mut self, assignment: AssignmentMethod) -> Self {
        self.assignment = assignment;
        self
    }

    /// Whether the similarity pass can produce any match.
    #[must_use]
    pub fn fuzzy_enabled(&self) -> bool {
        self.threshold < 1.0
    }

    /// Reject thresholds outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(MdbedError::config(format!(
                "similarity threshold must be between 0.0 and 1.0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
