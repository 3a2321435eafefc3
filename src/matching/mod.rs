//! Similarity matching between two segment sets.
//!
//! Matching runs in two passes:
//!
//! 1. **Exact**: segments with equal fingerprints pair up in document order.
//!    No embeddings are needed.
//! 2. **Similarity**: the remaining segments are embedded through the
//!    [`EmbeddingCache`], every pair scoring at least the threshold becomes a
//!    candidate, and candidates are committed one-to-one (greedy by default).
//!
//! Segments whose embedding is unavailable sit out the similarity pass and
//! are reported so callers know the affected `added`/`removed` entries may
//! hide a match.

mod assignment;
mod config;
mod exact;
mod similarity;

pub use config::{AssignmentMethod, MatchConfig, DEFAULT_THRESHOLD, PRESET_NAMES};
pub use similarity::cosine_similarity;
pub(crate) use similarity::pairs_within;

use crate::addressing::{ContentAddresser, Fingerprint};
use crate::embedding::{
    BatchOutcome, CancellationToken, Embedding, EmbeddingCache, EmbeddingProvider,
};
use crate::error::{ProviderError, Result};
use crate::model::{Document, Version};
use serde::Serialize;
use std::collections::HashSet;

/// How a correspondence was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Equal fingerprints
    Exact,
    /// Embedding similarity at or above the threshold
    Similarity,
}

/// A matched (old, new) segment pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correspondence {
    pub old_index: usize,
    pub new_index: usize,
    pub kind: MatchKind,
    /// 1.0 for exact matches, cosine similarity otherwise
    pub similarity: f64,
}

/// A thresholded similarity edge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Candidate {
    pub old_index: usize,
    pub new_index: usize,
    pub similarity: f64,
}

/// Fingerprinted view of one segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentKey<'a> {
    pub index: usize,
    pub fingerprint: Fingerprint,
    pub content: &'a str,
}

impl<'a> SegmentKey<'a> {
    /// Fingerprint every segment of a document.
    pub fn from_document(document: &'a Document, addresser: &ContentAddresser) -> Vec<Self> {
        document
            .segments()
            .iter()
            .map(|s| Self {
                index: s.index(),
                fingerprint: addresser.fingerprint(&s.content),
                content: &s.content,
            })
            .collect()
    }
}

/// A segment left out of the similarity pass.
#[derive(Debug, Clone, PartialEq)]
pub struct UnavailableSegment {
    pub version: Version,
    pub index: usize,
    pub fingerprint: Fingerprint,
    pub reason: ProviderError,
}

/// Matcher output: a one-to-one correspondence plus both residual sets.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Exact pairs first (in old order), then similarity pairs in commit order
    pub pairs: Vec<Correspondence>,
    /// Old indices matched by neither pass, ascending
    pub unmatched_old: Vec<usize>,
    /// New indices matched by neither pass, ascending
    pub unmatched_new: Vec<usize>,
    /// Segments whose embedding could not be obtained
    pub unavailable: Vec<UnavailableSegment>,
}

impl MatchOutcome {
    /// Number of pairs found by the exact pass.
    #[must_use]
    pub fn exact_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.kind == MatchKind::Exact).count()
    }
}

/// Two-pass segment matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityMatcher {
    config: MatchConfig,
}

impl SimilarityMatcher {
    #[must_use]
    pub const fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match two fingerprinted segment sets.
    ///
    /// The provider is only called for cache misses among segments left over
    /// by the exact pass, and not at all when the threshold is 1.0 or either
    /// residual set is empty.
    pub fn run(
        &self,
        old: &[SegmentKey<'_>],
        new: &[SegmentKey<'_>],
        provider: &dyn EmbeddingProvider,
        cache: &EmbeddingCache,
        cancel: &CancellationToken,
    ) -> Result<MatchOutcome> {
        let exact = exact::exact_pass(old, new);
        tracing::debug!(
            exact = exact.pairs.len(),
            residual_old = exact.residual_old.len(),
            residual_new = exact.residual_new.len(),
            "exact pass complete"
        );

        let mut outcome = MatchOutcome {
            pairs: exact.pairs,
            unmatched_old: exact.residual_old,
            unmatched_new: exact.residual_new,
            unavailable: Vec::new(),
        };

        if !self.config.fuzzy_enabled()
            || outcome.unmatched_old.is_empty()
            || outcome.unmatched_new.is_empty()
        {
            return Ok(outcome);
        }

        let requests: Vec<(Fingerprint, &str)> = outcome
            .unmatched_old
            .iter()
            .map(|&i| (old[i].fingerprint, old[i].content))
            .chain(
                outcome
                    .unmatched_new
                    .iter()
                    .map(|&i| (new[i].fingerprint, new[i].content)),
            )
            .collect();
        let fetched = cache.get_or_compute_batch(&requests, provider, cancel)?;

        let old_vectors = collect_embeddings(
            old,
            &outcome.unmatched_old,
            Version::Old,
            &fetched,
            &mut outcome.unavailable,
        );
        let new_vectors = collect_embeddings(
            new,
            &outcome.unmatched_new,
            Version::New,
            &fetched,
            &mut outcome.unavailable,
        );

        let candidates =
            similarity::candidate_pairs(&old_vectors, &new_vectors, self.config.threshold);
        let candidate_count = candidates.len();
        let assigned = assignment::assign(candidates, self.config.assignment);

        let matched_old: HashSet<usize> = assigned.iter().map(|c| c.old_index).collect();
        let matched_new: HashSet<usize> = assigned.iter().map(|c| c.new_index).collect();
        outcome.unmatched_old.retain(|i| !matched_old.contains(i));
        outcome.unmatched_new.retain(|i| !matched_new.contains(i));
        outcome
            .pairs
            .extend(assigned.into_iter().map(|c| Correspondence {
                old_index: c.old_index,
                new_index: c.new_index,
                kind: MatchKind::Similarity,
                similarity: c.similarity,
            }));

        tracing::debug!(
            candidates = candidate_count,
            fuzzy = outcome.pairs.len() - outcome.exact_count(),
            unavailable = outcome.unavailable.len(),
            threshold = self.config.threshold,
            method = %self.config.assignment,
            "similarity pass complete"
        );
        Ok(outcome)
    }
}

/// Embeddings for the residual segments of one side, recording failures.
fn collect_embeddings(
    keys: &[SegmentKey<'_>],
    residual: &[usize],
    version: Version,
    fetched: &BatchOutcome,
    unavailable: &mut Vec<UnavailableSegment>,
) -> Vec<(usize, Embedding)> {
    let mut available = Vec::with_capacity(residual.len());
    for &index in residual {
        let fingerprint = keys[index].fingerprint;
        match fetched.get(&fingerprint) {
            Some(Ok(embedding)) => available.push((index, Embedding::clone(embedding))),
            Some(Err(reason)) => unavailable.push(UnavailableSegment {
                version,
                index,
                fingerprint,
                reason: reason.clone(),
            }),
            None => {}
        }
    }
    available
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider with hand-picked vectors keyed by text.
    struct TableProvider {
        table: HashMap<&'static str, Vec<f32>>,
        calls: AtomicUsize,
    }

    impl TableProvider {
        fn new(entries: &[(&'static str, [f32; 2])]) -> Self {
            Self {
                table: entries.iter().map(|(k, v)| (*k, v.to_vec())).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl EmbeddingProvider for TableProvider {
        fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.table
                .get(text)
                .cloned()
                .ok_or_else(|| ProviderError::Failed(format!("no vector for {text}")))
        }

        fn embed_batch(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
            texts.iter().map(|t| self.embed(t)).collect()
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "table"
        }
    }

    fn run(
        old: &[&str],
        new: &[&str],
        config: MatchConfig,
        provider: &dyn EmbeddingProvider,
    ) -> MatchOutcome {
        let old_doc = Document::from_texts(Version::Old, old);
        let new_doc = Document::from_texts(Version::New, new);
        let addresser = ContentAddresser::new();
        SimilarityMatcher::new(config)
            .run(
                &SegmentKey::from_document(&old_doc, &addresser),
                &SegmentKey::from_document(&new_doc, &addresser),
                provider,
                &EmbeddingCache::new().with_batch_size(1),
                &CancellationToken::new(),
            )
            .unwrap()
    }

    #[test]
    fn test_identical_documents_skip_provider() {
        let provider = TableProvider::new(&[]);
        let outcome = run(&["a", "b"], &["a", "b"], MatchConfig::default(), &provider);
        assert_eq!(outcome.exact_count(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fuzzy_pass_above_threshold() {
        let provider = TableProvider::new(&[("old text", [1.0, 0.1]), ("new text", [1.0, 0.2])]);
        let outcome = run(&["old text"], &["new text"], MatchConfig::default(), &provider);
        assert_eq!(outcome.pairs.len(), 1);
        assert_eq!(outcome.pairs[0].kind, MatchKind::Similarity);
        assert!(outcome.pairs[0].similarity > 0.9);
        assert!(outcome.unmatched_old.is_empty());
    }

    #[test]
    fn test_below_threshold_stays_unmatched() {
        let provider = TableProvider::new(&[("old text", [1.0, 0.0]), ("new text", [0.0, 1.0])]);
        let outcome = run(&["old text"], &["new text"], MatchConfig::default(), &provider);
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unmatched_old, vec![0]);
        assert_eq!(outcome.unmatched_new, vec![0]);
    }

    #[test]
    fn test_exact_only_never_embeds() {
        let provider = TableProvider::new(&[("x", [1.0, 0.0]), ("y", [1.0, 0.0])]);
        let outcome = run(&["x"], &["y"], MatchConfig::exact_only(), &provider);
        assert!(outcome.pairs.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unavailable_segments_are_reported() {
        let provider = TableProvider::new(&[("known", [1.0, 0.0])]);
        let outcome = run(&["known"], &["unknown"], MatchConfig::default(), &provider);
        assert!(outcome.pairs.is_empty());
        assert_eq!(outcome.unavailable.len(), 1);
        assert_eq!(outcome.unavailable[0].version, Version::New);
        assert_eq!(outcome.unmatched_new, vec![0]);
    }

    #[test]
    fn test_shared_content_embedded_once() {
        let provider = HashEmbedder::new(64);
        let old_doc = Document::from_texts(Version::Old, &["alpha beta", "gamma"]);
        let new_doc = Document::from_texts(Version::New, &["alpha beta gamma"]);
        let addresser = ContentAddresser::new();
        let cache = EmbeddingCache::new();
        let old_keys = SegmentKey::from_document(&old_doc, &addresser);
        let new_keys = SegmentKey::from_document(&new_doc, &addresser);
        let matcher = SimilarityMatcher::new(MatchConfig::permissive());
        matcher
            .run(&old_keys, &new_keys, &provider, &cache, &CancellationToken::new())
            .unwrap();
        matcher
            .run(&old_keys, &new_keys, &provider, &cache, &CancellationToken::new())
            .unwrap();
        let stats = cache.stats();
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.hits, 3);
    }
}
