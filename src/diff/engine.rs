//! Document comparison engine.

use super::anchor::line_changes;
use super::classify::{build_entries, build_warnings};
use super::result::{DiffKind, DiffReport};
use crate::addressing::ContentAddresser;
use crate::embedding::{CancellationToken, EmbeddingCache, EmbeddingProvider};
use crate::error::Result;
use crate::matching::{AssignmentMethod, MatchConfig, SegmentKey, SimilarityMatcher};
use crate::model::{Document, Version};
use crate::segment::{segment_document, SegmentationPolicy};

/// Semantic diff engine for comparing segmented documents.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    match_config: MatchConfig,
    line_detail: bool,
}

impl DiffEngine {
    /// Create a new diff engine with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set matching configuration
    #[must_use]
    pub const fn with_match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    /// Override the similarity threshold
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.match_config.threshold = threshold;
        self
    }

    /// Fingerprint with whitespace normalization
    #[must_use]
    pub const fn ignore_whitespace(mut self, ignore: bool) -> Self {
        self.match_config.ignore_whitespace = ignore;
        self
    }

    #[must_use]
    pub const fn with_assignment(mut self, method: AssignmentMethod) -> Self {
        self.match_config.assignment = method;
        self
    }

    /// Attach line-level changes to modified entries
    #[must_use]
    pub const fn line_detail(mut self, enabled: bool) -> Self {
        self.line_detail = enabled;
        self
    }

    #[must_use]
    pub const fn match_config(&self) -> &MatchConfig {
        &self.match_config
    }

    /// Compare two documents and return the diff report.
    ///
    /// Configuration problems (threshold out of range, a cache bound to a
    /// different model or dimension) are reported before any provider call.
    /// Segments whose embedding cannot be obtained stay unmatched and are
    /// listed in [`DiffReport::warnings`].
    pub fn compare(
        &self,
        old: &Document,
        new: &Document,
        provider: &dyn EmbeddingProvider,
        cache: &EmbeddingCache,
        cancel: &CancellationToken,
    ) -> Result<DiffReport> {
        self.match_config.validate()?;
        cache.bind(provider)?;

        let addresser = ContentAddresser::with_ignore_whitespace(self.match_config.ignore_whitespace);
        let old_keys = SegmentKey::from_document(old, &addresser);
        let new_keys = SegmentKey::from_document(new, &addresser);

        let outcome = SimilarityMatcher::new(self.match_config).run(
            &old_keys, &new_keys, provider, cache, cancel,
        )?;

        for unavailable in &outcome.unavailable {
            tracing::warn!(
                version = %unavailable.version,
                position = unavailable.index,
                fingerprint = %unavailable.fingerprint.short(),
                "embedding unavailable: {}",
                unavailable.reason
            );
        }

        let mut entries = build_entries(&outcome, old, new);
        if self.line_detail {
            for entry in &mut entries {
                if !matches!(entry.kind, DiffKind::Modified | DiffKind::MovedModified) {
                    continue;
                }
                if let (Some(o), Some(n)) = (entry.old_position, entry.new_position) {
                    entry.line_changes =
                        line_changes(&old.segments()[o].content, &new.segments()[n].content);
                }
            }
        }

        let report = DiffReport::new(entries, build_warnings(&outcome, old, new));
        tracing::info!(
            old_segments = old.len(),
            new_segments = new.len(),
            changes = report.summary.total_changes,
            warnings = report.warnings.len(),
            "comparison complete"
        );
        Ok(report)
    }

    /// Segment two raw sources with one policy and compare them.
    pub fn compare_sources(
        &self,
        old_source: &str,
        new_source: &str,
        policy: SegmentationPolicy,
        provider: &dyn EmbeddingProvider,
        cache: &EmbeddingCache,
        cancel: &CancellationToken,
    ) -> Result<DiffReport> {
        let old = segment_document(old_source, policy, Version::Old)?;
        let new = segment_document(new_source, policy, Version::New)?;
        self.compare(&old, &new, provider, cache, cancel)
    }
}
