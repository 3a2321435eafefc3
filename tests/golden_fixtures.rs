use mdbed::diff::DiffKind;
use mdbed::embedding::{CancellationToken, EmbeddingCache};
use mdbed::pipeline::parse_document_with_context;
use mdbed::{DiffEngine, DiffReport, HashEmbedder, SegmentationPolicy, Version};
use std::path::Path;

fn diff_fixtures(old: &str, new: &str, policy: SegmentationPolicy) -> DiffReport {
    let old = parse_document_with_context(Path::new(old), policy, Version::Old, true)
        .expect("failed to parse old fixture");
    let new = parse_document_with_context(Path::new(new), policy, Version::New, true)
        .expect("failed to parse new fixture");

    DiffEngine::new()
        .line_detail(true)
        .compare(
            &old.document,
            &new.document,
            &HashEmbedder::default(),
            &EmbeddingCache::new(),
            &CancellationToken::new(),
        )
        .expect("diff should succeed")
}

#[test]
fn golden_markdown_reordered_sections() {
    let report = diff_fixtures(
        "tests/fixtures/guide_old.md",
        "tests/fixtures/guide_new.md",
        SegmentationPolicy::MarkdownSections,
    );

    // Project stays, Usage moves up, Installation moves down with an edit,
    // License is replaced by Changelog
    assert_eq!(report.summary.unchanged, 1);
    assert_eq!(report.summary.moved, 1);
    assert_eq!(report.summary.moved_modified, 1);
    assert_eq!(report.summary.removed, 1);
    assert_eq!(report.summary.added, 1);
    assert_eq!(report.summary.total_changes, 4);

    let edited = report.entries_of(DiffKind::MovedModified).next().unwrap();
    assert_eq!((edited.old_position, edited.new_position), (Some(1), Some(2)));
    assert!(edited.similarity.unwrap() >= 0.7);
    assert_eq!(edited.line_changes.len(), 2);

    let moved = report.entries_of(DiffKind::Moved).next().unwrap();
    assert_eq!(moved.similarity, Some(1.0));
    assert!(moved.line_changes.is_empty());
}

#[test]
fn golden_python_moved_definitions() {
    let report = diff_fixtures(
        "tests/fixtures/store_old.py",
        "tests/fixtures/store_new.py",
        SegmentationPolicy::Python,
    );

    assert_eq!(report.summary.unchanged, 1);
    assert_eq!(report.summary.moved, 2);
    assert_eq!(report.summary.removed, 1);
    assert_eq!(report.summary.added, 1);

    let added = report.entries_of(DiffKind::Added).next().unwrap();
    assert_eq!(added.new_path.as_deref(), Some("def remove"));
    let removed = report.entries_of(DiffKind::Removed).next().unwrap();
    assert_eq!(removed.old_path.as_deref(), Some("def save"));
}

#[test]
fn golden_report_is_deterministic() {
    let render = || {
        serde_json::to_string_pretty(&diff_fixtures(
            "tests/fixtures/guide_old.md",
            "tests/fixtures/guide_new.md",
            SegmentationPolicy::MarkdownSections,
        ))
        .unwrap()
    };
    assert_eq!(render(), render());
}
