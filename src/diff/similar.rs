//! Near-duplicate search within one document.

use super::engine::DiffEngine;
use super::result::ReportWarning;
use crate::addressing::ContentAddresser;
use crate::embedding::{CancellationToken, Embedding, EmbeddingCache, EmbeddingProvider};
use crate::error::Result;
use crate::matching::{pairs_within, SegmentKey};
use crate::model::Document;
use serde::{Deserialize, Serialize};

/// Two segments of the same document scoring at least the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPair {
    /// Position of the earlier segment
    pub source: usize,
    /// Position of the later segment
    pub target: usize,
    pub source_path: String,
    pub target_path: String,
    pub similarity: f64,
}

/// Result of [`DiffEngine::find_similar`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarReport {
    /// Number of segments searched
    pub segments: usize,
    /// Highest similarity first, ties by (source, target)
    pub pairs: Vec<SimilarPair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReportWarning>,
}

impl DiffEngine {
    /// Every unordered pair of segments in `document` whose similarity is at
    /// least the configured threshold.
    ///
    /// Segments sharing a fingerprint pair with similarity 1.0. When the
    /// threshold is 1.0 only those are reported and the provider is never
    /// called. Segments without an embedding are skipped with a warning.
    pub fn find_similar(
        &self,
        document: &Document,
        provider: &dyn EmbeddingProvider,
        cache: &EmbeddingCache,
        cancel: &CancellationToken,
    ) -> Result<SimilarReport> {
        let config = self.match_config();
        config.validate()?;
        cache.bind(provider)?;

        let addresser = ContentAddresser::with_ignore_whitespace(config.ignore_whitespace);
        let keys = SegmentKey::from_document(document, &addresser);

        let mut warnings = Vec::new();
        let candidates = if config.fuzzy_enabled() {
            let requests: Vec<_> = keys.iter().map(|k| (k.fingerprint, k.content)).collect();
            let fetched = cache.get_or_compute_batch(&requests, provider, cancel)?;

            let mut vectors = Vec::with_capacity(keys.len());
            for key in &keys {
                match fetched.get(&key.fingerprint) {
                    Some(Ok(embedding)) => vectors.push((key.index, Embedding::clone(embedding))),
                    Some(Err(reason)) => {
                        tracing::warn!(
                            position = key.index,
                            fingerprint = %key.fingerprint.short(),
                            "embedding unavailable: {}",
                            reason
                        );
                        warnings.push(ReportWarning {
                            version: document.version(),
                            position: key.index,
                            path: document.segments()[key.index].path().to_string(),
                            fingerprint: key.fingerprint,
                            message: format!("embedding unavailable: {reason}"),
                        });
                    }
                    None => {}
                }
            }
            pairs_within(&vectors, config.threshold)
                .into_iter()
                .map(|c| {
                    let identical = keys[c.old_index].fingerprint == keys[c.new_index].fingerprint;
                    (c.old_index, c.new_index, if identical { 1.0 } else { c.similarity })
                })
                .collect::<Vec<_>>()
        } else {
            let mut exact = Vec::new();
            for (offset, a) in keys.iter().enumerate() {
                for b in &keys[offset + 1..] {
                    if a.fingerprint == b.fingerprint {
                        exact.push((a.index, b.index, 1.0));
                    }
                }
            }
            exact
        };

        let mut pairs: Vec<SimilarPair> = candidates
            .into_iter()
            .map(|(source, target, similarity)| SimilarPair {
                source,
                target,
                source_path: document.segments()[source].path().to_string(),
                target_path: document.segments()[target].path().to_string(),
                similarity,
            })
            .collect();
        pairs.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then(a.source.cmp(&b.source))
                .then(a.target.cmp(&b.target))
        });

        tracing::info!(
            segments = document.len(),
            pairs = pairs.len(),
            warnings = warnings.len(),
            threshold = config.threshold,
            "similarity search complete"
        );
        Ok(SimilarReport {
            segments: document.len(),
            pairs,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MdbedError, ProviderError};
    use crate::model::Version;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    fn search(texts: &[&str], engine: &DiffEngine, provider: &TableProvider) -> SimilarReport {
        engine
            .find_similar(
                &Document::from_texts(Version::Old, texts),
                provider,
                &EmbeddingCache::new().with_batch_size(1),
                &CancellationToken::new(),
            )
            .unwrap()
    }

    #[test]
    fn test_pairs_sorted_by_similarity() {
        let provider = TableProvider::new(&[
            ("install steps", [1.0, 0.0]),
            ("unrelated", [0.0, 1.0]),
            ("installation steps", [1.0, 0.1]),
            ("setup steps", [1.0, 0.3]),
        ]);
        let texts = ["install steps", "unrelated", "installation steps", "setup steps"];
        let report = search(&texts, &DiffEngine::new(), &provider);

        let found: Vec<_> = report.pairs.iter().map(|p| (p.source, p.target)).collect();
        assert_eq!(found, vec![(0, 2), (2, 3), (0, 3)]);
        assert!(report
            .pairs
            .windows(2)
            .all(|w| w[0].similarity >= w[1].similarity));
        assert_eq!(report.pairs[1].source_path, "s[2]");
        assert_eq!(report.segments, 4);
    }

    #[test]
    fn test_duplicates_pair_at_one() {
        let provider = TableProvider::new(&[("same", [1.0, 0.0]), ("other", [0.0, 1.0])]);
        let report = search(&["same", "other", "same"], &DiffEngine::new(), &provider);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!((report.pairs[0].source, report.pairs[0].target), (0, 2));
        assert_eq!(report.pairs[0].similarity, 1.0);
        // One call per distinct text
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_exact_threshold_never_embeds() {
        let provider = TableProvider::new(&[]);
        let engine = DiffEngine::new().with_threshold(1.0);
        let report = search(&["a", "b", "a"], &engine, &provider);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_embedding_is_warned_and_skipped() {
        let provider = TableProvider::new(&[("known", [1.0, 0.0]), ("twin", [1.0, 0.0])]);
        let report = search(&["known", "lost", "twin"], &DiffEngine::new(), &provider);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].position, 1);
        assert_eq!(report.warnings[0].version, Version::Old);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = DiffEngine::new()
            .with_threshold(-0.1)
            .find_similar(
                &Document::from_texts(Version::Old, &["a"]),
                &TableProvider::new(&[]),
                &EmbeddingCache::new(),
                &CancellationToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, MdbedError::Configuration(_)));
    }
}
