//! Diff computation stage.
//!
//! Builds the provider and the embedding cache from configuration, runs the
//! engine (a two-document diff or a single-document similarity search), and
//! persists newly computed embeddings.

use super::{ParsedDocument, PipelineError};
use crate::config::AppConfig;
use crate::diff::{DiffEngine, DiffReport, SimilarReport};
use crate::embedding::{
    build_provider, CacheStore, CancellationToken, EmbeddingCache, EmbeddingProvider,
};
use anyhow::{Context, Result};

/// Open the persisted cache for the configured provider, if caching is on.
///
/// Returns the store handle alongside the loaded cache so the caller can
/// save it back after the comparison.
pub fn open_cache(
    config: &AppConfig,
    model: &str,
    dimension: usize,
) -> Result<(EmbeddingCache, Option<CacheStore>)> {
    let store = if config.cache.enabled {
        config.cache.resolved_path().map(CacheStore::new)
    } else {
        None
    };

    let cache = match &store {
        Some(store) => store
            .load(model, dimension)
            .with_context(|| format!("Failed to open embedding cache {}", store.path().display()))?,
        None => EmbeddingCache::new(),
    };
    Ok((cache.with_batch_size(config.embedding.batch_size), store))
}

/// A computed report with the model whose embeddings produced it.
#[derive(Debug)]
pub struct StageOutput<R> {
    pub report: R,
    pub model: String,
}

/// Build the provider and cache, run `stage`, and persist new embeddings.
fn with_embeddings<R>(
    config: &AppConfig,
    stage: impl FnOnce(&DiffEngine, &dyn EmbeddingProvider, &EmbeddingCache) -> crate::error::Result<R>,
) -> Result<StageOutput<R>> {
    let provider = build_provider(&config.embedding).context("Failed to set up embedding provider")?;
    let model = provider.model_name().to_string();
    let (cache, store) = open_cache(config, &model, provider.dimension())?;
    let preloaded = cache.len();

    if !config.behavior.quiet {
        tracing::info!(
            "Computing embeddings ({} cached, model {})...",
            preloaded,
            model
        );
    }

    let engine = DiffEngine::new()
        .with_match_config(config.matching.to_match_config())
        .line_detail(config.matching.line_detail);

    let report = stage(&engine, provider.as_ref(), &cache)
        .map_err(|e| PipelineError::DiffFailed { source: e.into() })?;

    let stats = cache.stats();
    tracing::debug!(
        lookups = stats.lookups,
        hits = stats.hits,
        misses = stats.misses,
        provider_calls = stats.provider_calls,
        failures = stats.failures,
        hit_rate = stats.hit_rate(),
        "embedding cache statistics"
    );

    if let Some(store) = store {
        if cache.len() > preloaded {
            // A failed save only costs recomputation next time
            if let Err(e) = store.save(&cache, &model, provider.dimension()) {
                tracing::warn!("Failed to save embedding cache: {}", e);
            }
        }
    }

    Ok(StageOutput { report, model })
}

/// Run the core diff computation between two documents.
pub fn compute_diff(
    config: &AppConfig,
    old: &ParsedDocument,
    new: &ParsedDocument,
    cancel: &CancellationToken,
) -> Result<StageOutput<DiffReport>> {
    let output = with_embeddings(config, |engine, provider, cache| {
        engine.compare(&old.document, &new.document, provider, cache, cancel)
    })?;

    if !config.behavior.quiet {
        let summary = &output.report.summary;
        tracing::info!(
            "Diff complete: {} changes ({} added, {} removed, {} modified, {} moved)",
            summary.total_changes,
            summary.added,
            summary.removed,
            summary.modified + summary.moved_modified,
            summary.moved
        );
    }

    Ok(output)
}

/// Find near-duplicate segment pairs within one document.
pub fn compute_similar(
    config: &AppConfig,
    input: &ParsedDocument,
    cancel: &CancellationToken,
) -> Result<StageOutput<SimilarReport>> {
    let output = with_embeddings(config, |engine, provider, cache| {
        engine.find_similar(&input.document, provider, cache, cancel)
    })?;

    if !config.behavior.quiet {
        tracing::info!(
            "Found {} similar pairs among {} segments",
            output.report.pairs.len(),
            output.report.segments
        );
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Version;
    use crate::segment::{segment_document, SegmentationPolicy};
    use std::path::PathBuf;

    fn parsed(source: &str, version: Version) -> ParsedDocument {
        ParsedDocument {
            document: segment_document(source, SegmentationPolicy::Paragraphs, version).unwrap(),
            policy: Some(SegmentationPolicy::Paragraphs),
            path: PathBuf::from("doc.txt"),
        }
    }

    #[test]
    fn test_compute_diff_persists_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("embeddings.json");
        let config = AppConfig::builder()
            .cache_path(Some(cache_path.clone()))
            .quiet(true)
            .build();

        let old = parsed("alpha beta gamma delta\n\nunrelated words here\n", Version::Old);
        let new = parsed("alpha beta gamma epsilon\n", Version::New);
        compute_diff(&config, &old, &new, &CancellationToken::new()).unwrap();
        assert!(cache_path.exists());

        let (cache, _) = open_cache(&config, "hash-v1", 384).unwrap();
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_compute_diff_without_cache() {
        let config = AppConfig::builder().cache_enabled(false).quiet(true).build();
        let old = parsed("same\n", Version::Old);
        let new = parsed("same\n", Version::New);
        let output = compute_diff(&config, &old, &new, &CancellationToken::new()).unwrap();
        assert!(!output.report.has_changes());
    }

    #[test]
    fn test_cancelled_diff_fails() {
        let config = AppConfig::builder().cache_enabled(false).quiet(true).build();
        let old = parsed("one thing\n", Version::Old);
        let new = parsed("another thing\n", Version::New);
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(compute_diff(&config, &old, &new, &cancel).is_err());
    }

    #[test]
    fn test_output_names_provider_model() {
        let config = AppConfig::builder().cache_enabled(false).quiet(true).build();
        let old = parsed("one\n", Version::Old);
        let new = parsed("two\n", Version::New);
        let output = compute_diff(&config, &old, &new, &CancellationToken::new()).unwrap();
        assert_eq!(output.model, "hash-v1");
    }

    #[test]
    fn test_compute_similar_finds_repeated_paragraph() {
        let config = AppConfig::builder().cache_enabled(false).quiet(true).build();
        let input = parsed(
            "install the package first\n\nsomething else entirely\n\ninstall the package first\n",
            Version::Old,
        );
        let output = compute_similar(&config, &input, &CancellationToken::new()).unwrap();
        assert_eq!(output.report.segments, 3);
        assert_eq!(output.report.pairs[0].source, 0);
        assert_eq!(output.report.pairs[0].target, 2);
        assert_eq!(output.model, "hash-v1");
    }
}
