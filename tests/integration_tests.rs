//! End-to-end comparisons through the public API.
//!
//! Most tests use a table-driven provider so similarity values are exact and
//! provider calls can be counted. Most run with a batch size of one so that
//! call counts are exact.

use mdbed::diff::{DiffEntry, DiffKind};
use mdbed::embedding::{CancellationToken, EmbeddingCache, EmbeddingProvider, ProviderResult};
use mdbed::error::ProviderError;
use mdbed::{DiffEngine, DiffReport, Document, MatchConfig, Version};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns fixed vectors per text and counts every text it is asked to embed.
struct TableProvider {
    vectors: HashMap<&'static str, [f32; 3]>,
    calls: AtomicUsize,
}

impl TableProvider {
    fn new(vectors: &[(&'static str, [f32; 3])]) -> Self {
        Self {
            vectors: vectors.iter().copied().collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for TableProvider {
    fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectors
            .get(text.trim())
            .map(|v| v.to_vec())
            .ok_or_else(|| ProviderError::Failed(format!("no vector for {text:?}")))
    }

    fn dimension(&self) -> usize {
        3
    }

    fn model_name(&self) -> &str {
        "table"
    }
}

fn compare_with(
    old: &[&str],
    new: &[&str],
    provider: &dyn EmbeddingProvider,
    config: MatchConfig,
) -> DiffReport {
    DiffEngine::new()
        .with_match_config(config)
        .compare(
            &Document::from_texts(Version::Old, old),
            &Document::from_texts(Version::New, new),
            provider,
            &EmbeddingCache::new().with_batch_size(1),
            &CancellationToken::new(),
        )
        .expect("comparison should succeed")
}

fn compare(old: &[&str], new: &[&str], provider: &dyn EmbeddingProvider) -> DiffReport {
    compare_with(old, new, provider, MatchConfig::default())
}

fn shape(entry: &DiffEntry) -> (DiffKind, Option<usize>, Option<usize>) {
    (entry.kind, entry.old_position, entry.new_position)
}

#[test]
fn identical_documents_need_no_embeddings() {
    let provider = TableProvider::new(&[]);
    let texts = ["alpha", "beta", "gamma"];
    let report = compare(&texts, &texts, &provider);

    assert_eq!(report.entries.len(), 3);
    assert!(report.entries.iter().all(|e| e.kind == DiffKind::Unchanged));
    assert!(!report.has_changes());
    assert_eq!(provider.calls(), 0);
}

#[test]
fn swapped_functions_are_two_moves() {
    let provider = TableProvider::new(&[]);
    let report = compare(
        &["def foo(): return 1", "def bar(): return 2"],
        &["def bar(): return 2", "def foo(): return 1"],
        &provider,
    );

    let shapes: Vec<_> = report.entries.iter().map(shape).collect();
    assert_eq!(
        shapes,
        vec![
            (DiffKind::Moved, Some(1), Some(0)),
            (DiffKind::Moved, Some(0), Some(1)),
        ]
    );
    assert!(report.entries.iter().all(|e| e.similarity == Some(1.0)));
    assert_eq!(provider.calls(), 0);
}

#[test]
fn single_relocation_has_no_additions_or_removals() {
    let provider = TableProvider::new(&[]);
    let report = compare(&["a", "b", "c", "d"], &["b", "c", "a", "d"], &provider);

    assert_eq!(report.summary.added, 0);
    assert_eq!(report.summary.removed, 0);
    assert!(report.summary.moved >= 1);
    let moved_a = report
        .entries
        .iter()
        .find(|e| e.old_position == Some(0))
        .unwrap();
    assert_eq!(moved_a.kind, DiffKind::Moved);
    assert_eq!(moved_a.new_position, Some(2));
}

#[test]
fn similar_content_in_place_is_modified() {
    let provider = TableProvider::new(&[
        ("intro text", [1.0, 0.1, 0.0]),
        ("intro text, revised", [1.0, 0.2, 0.0]),
    ]);
    let report = compare(&["intro text"], &["intro text, revised"], &provider);

    assert_eq!(report.entries.len(), 1);
    let entry = &report.entries[0];
    assert_eq!(shape(entry), (DiffKind::Modified, Some(0), Some(0)));
    assert!(entry.similarity.unwrap() > 0.9);
    assert_eq!(provider.calls(), 2);
}

#[test]
fn similar_content_elsewhere_is_moved_modified() {
    let provider = TableProvider::new(&[
        ("keep", [0.0, 0.0, 1.0]),
        ("edited", [1.0, 0.0, 0.0]),
        ("edited again", [0.98, 0.05, 0.0]),
    ]);
    let report = compare(&["edited", "keep"], &["keep", "edited again"], &provider);

    let kinds: Vec<_> = report.entries.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![DiffKind::Moved, DiffKind::MovedModified]);
}

#[test]
fn dissimilar_content_in_place_is_removed_and_added() {
    let provider = TableProvider::new(&[
        ("old words", [1.0, 0.0, 0.0]),
        ("new words", [0.0, 1.0, 0.0]),
    ]);
    let report = compare(&["old words"], &["new words"], &provider);

    assert_eq!(report.summary.modified, 0);
    assert_eq!(report.summary.removed, 1);
    assert_eq!(report.summary.added, 1);
}

#[test]
fn emptied_document_removes_everything() {
    let report = compare(&["x=1"], &[], &TableProvider::new(&[]));
    assert_eq!(report.entries.len(), 1);
    assert_eq!(shape(&report.entries[0]), (DiffKind::Removed, Some(0), None));
    assert_eq!(report.entries[0].similarity, None);
}

#[test]
fn new_document_adds_everything() {
    let report = compare(&[], &["y=2"], &TableProvider::new(&[]));
    assert_eq!(report.entries.len(), 1);
    assert_eq!(shape(&report.entries[0]), (DiffKind::Added, None, Some(0)));
}

#[test]
fn both_empty_is_empty_report() {
    let report = compare(&[], &[], &TableProvider::new(&[]));
    assert!(report.entries.is_empty());
    assert_eq!(report.summary.total_changes, 0);
}

#[test]
fn exact_only_threshold_never_embeds() {
    let provider = TableProvider::new(&[]);
    let report = compare_with(&["one", "two"], &["two", "three"], &provider, MatchConfig::exact_only());

    assert_eq!(provider.calls(), 0);
    assert_eq!(report.summary.added, 1);
    assert_eq!(report.summary.removed, 1);
    assert_eq!(report.summary.moved, 1);
}

#[test]
fn duplicate_contents_embed_once() {
    let provider = TableProvider::new(&[
        ("same", [1.0, 0.0, 0.0]),
        ("other", [0.0, 1.0, 0.0]),
    ]);
    compare(&["same", "same", "gone"], &["other"], &provider);
    // "gone" has no vector and fails, "same" is asked for once
    assert_eq!(provider.calls(), 3);
}

#[test]
fn unavailable_embedding_degrades_to_warning() {
    let provider = TableProvider::new(&[("known", [1.0, 0.0, 0.0])]);
    let report = compare(&["known"], &["unknown"], &provider);

    assert_eq!(report.summary.removed, 1);
    assert_eq!(report.summary.added, 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].version, Version::New);
    assert_eq!(report.warnings[0].position, 0);
}

#[test]
fn failing_text_does_not_degrade_its_batch() {
    let provider = TableProvider::new(&[
        ("the quick brown fox jumps over the lazy dog", [1.0, 0.1, 0.0]),
        ("the quick brown fox jumps over the lazy cat", [1.0, 0.2, 0.0]),
    ]);
    let report = DiffEngine::new()
        .compare(
            &Document::from_texts(
                Version::Old,
                &["the quick brown fox jumps over the lazy dog", "poison old"],
            ),
            &Document::from_texts(
                Version::New,
                &["the quick brown fox jumps over the lazy cat", "poison new"],
            ),
            &provider,
            &EmbeddingCache::new(),
            &CancellationToken::new(),
        )
        .unwrap();

    let fox = report
        .entries
        .iter()
        .find(|e| e.old_position == Some(0))
        .unwrap();
    assert_eq!(shape(fox), (DiffKind::Modified, Some(0), Some(0)));
    assert_eq!(report.summary.removed, 1);
    assert_eq!(report.summary.added, 1);
    assert_eq!(report.warnings.len(), 2);
    assert_eq!(report.warnings[0].version, Version::Old);
    assert_eq!(report.warnings[0].position, 1);
    assert_eq!(report.warnings[1].version, Version::New);
    assert_eq!(report.warnings[1].position, 1);
}

#[test]
fn repeated_comparison_is_byte_identical() {
    let provider = mdbed::HashEmbedder::default();
    let old = ["install the package", "configure the tool", "run the tests"];
    let new = ["run the tests", "install the package quickly", "deploy"];

    let first = serde_json::to_string(&compare(&old, &new, &provider)).unwrap();
    let second = serde_json::to_string(&compare(&old, &new, &provider)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cache_is_reused_across_comparisons() {
    let provider = TableProvider::new(&[
        ("left", [1.0, 0.0, 0.0]),
        ("right", [0.9, 0.1, 0.0]),
    ]);
    let cache = EmbeddingCache::new();
    let engine = DiffEngine::new();
    let old = Document::from_texts(Version::Old, &["left"]);
    let new = Document::from_texts(Version::New, &["right"]);

    for _ in 0..2 {
        engine
            .compare(&old, &new, &provider, &cache, &CancellationToken::new())
            .unwrap();
    }
    assert_eq!(provider.calls(), 2);
    assert_eq!(cache.len(), 2);
}
