//! Document reading and segmentation.

use super::inputs::{collect_files, name_filter, walk_directory};
use super::PipelineError;
use crate::config::AppConfig;
use crate::model::{Document, Version};
use crate::segment::{segment_document, SegmentationPolicy};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A segmented document together with how it was produced
pub struct ParsedDocument {
    pub document: Document,
    /// Policy applied to every file, or `None` when each file of a
    /// directory input used its own detected policy
    pub policy: Option<SegmentationPolicy>,
    pub path: PathBuf,
}

impl ParsedDocument {
    /// Display form of the source path.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Policy name for reports.
    #[must_use]
    pub fn policy_label(&self) -> String {
        self.policy
            .map_or_else(|| "per-file".to_string(), |p| p.to_string())
    }
}

/// Configured policy, or the one detected from `path`.
#[must_use]
pub fn resolve_policy(config: &AppConfig, path: &Path) -> SegmentationPolicy {
    config
        .segmentation
        .policy
        .unwrap_or_else(|| SegmentationPolicy::detect(path))
}

/// Policy for an input path: the configured one, the one detected from a
/// file's name, or `None` for a directory whose files are detected one by one.
#[must_use]
pub fn resolve_input_policy(config: &AppConfig, path: &Path) -> Option<SegmentationPolicy> {
    if path.is_dir() {
        config.segmentation.policy
    } else {
        Some(resolve_policy(config, path))
    }
}

/// Read and segment a document with context for error messages
pub fn parse_document_with_context(
    path: &Path,
    policy: SegmentationPolicy,
    version: Version,
    quiet: bool,
) -> Result<ParsedDocument> {
    if !quiet {
        tracing::info!("Reading {} document: {}", version, path.display());
    }

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    let document = segment_document(&source, policy, version)
        .map_err(|e| PipelineError::ParseFailed {
            path: path.display().to_string(),
            source: e.into(),
        })?
        .with_name(path.display().to_string());

    if !quiet {
        tracing::info!("Segmented into {} segments ({})", document.len(), policy);
    }

    Ok(ParsedDocument {
        document,
        policy: Some(policy),
        path: path.to_path_buf(),
    })
}

/// Read a file, or every matching file of a directory, as one document.
///
/// Directory contents are concatenated in path order with segment paths
/// qualified by the file's location relative to the directory
/// (`guide/setup.md:1.2`), so the same file in two directory snapshots
/// yields the same labels.
pub fn parse_input(
    config: &AppConfig,
    path: &Path,
    policy: Option<SegmentationPolicy>,
    version: Version,
) -> Result<ParsedDocument> {
    let quiet = config.behavior.quiet;
    if !path.is_dir() {
        let policy = policy.unwrap_or_else(|| SegmentationPolicy::detect(path));
        return parse_document_with_context(path, policy, version, quiet);
    }

    let filter = name_filter(&config.segmentation)?;
    let files = walk_directory(path, config.segmentation.recursive, &filter)?;
    if !quiet {
        tracing::info!("Reading {} files from {}", files.len(), path.display());
    }

    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        let label = file.strip_prefix(path).unwrap_or(file).display().to_string();
        parts.push((label, parse_file(file, policy, version)?));
    }
    Ok(ParsedDocument {
        document: Document::concat(version, parts).with_name(path.display().to_string()),
        policy,
        path: path.to_path_buf(),
    })
}

/// Read every file named by `paths` (expanding directories) as one document
/// whose segment paths are qualified by file path.
pub fn parse_inputs(
    config: &AppConfig,
    paths: &[PathBuf],
    version: Version,
) -> Result<ParsedDocument> {
    let files = collect_files(paths, &config.segmentation)?;
    if !config.behavior.quiet {
        tracing::info!("Reading {} files", files.len());
    }

    let policy = config.segmentation.policy;
    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        parts.push((file.display().to_string(), parse_file(file, policy, version)?));
    }

    let document = Document::concat(version, parts);
    Ok(match paths {
        [single] => ParsedDocument {
            document: document.with_name(single.display().to_string()),
            policy,
            path: single.clone(),
        },
        _ => ParsedDocument {
            document,
            policy,
            path: PathBuf::new(),
        },
    })
}

/// Segment one file of a multi-file input.
fn parse_file(
    file: &Path,
    policy: Option<SegmentationPolicy>,
    version: Version,
) -> Result<Document> {
    let policy = policy.unwrap_or_else(|| SegmentationPolicy::detect(file));
    Ok(parse_document_with_context(file, policy, version, true)?.document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_policy_prefers_config() {
        let config = AppConfig::builder()
            .policy(SegmentationPolicy::Paragraphs)
            .build();
        assert_eq!(
            resolve_policy(&config, Path::new("x.md")),
            SegmentationPolicy::Paragraphs
        );
        assert_eq!(
            resolve_policy(&AppConfig::default(), Path::new("x.py")),
            SegmentationPolicy::Python
        );
    }

    #[test]
    fn test_parse_document() {
        let mut file = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
        write!(file, "# One\n\nbody\n\n# Two\n\nmore\n").unwrap();
        let parsed = parse_document_with_context(
            file.path(),
            SegmentationPolicy::MarkdownSections,
            Version::Old,
            true,
        )
        .unwrap();
        assert_eq!(parsed.document.len(), 2);
        assert_eq!(parsed.document.name(), Some(parsed.display_path().as_str()));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = parse_document_with_context(
            Path::new("/no/such/file.md"),
            SegmentationPolicy::MarkdownSections,
            Version::New,
            true,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("/no/such/file.md"));
    }

    fn snapshot(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn test_directory_input_qualifies_paths() {
        let dir = snapshot(&[
            ("b.md", "# Beta\n\nbody\n"),
            ("a.md", "# Alpha\n\nbody\n\n## Detail\n"),
            ("skip.txt", "not markdown\n"),
        ]);
        let parsed = parse_input(&AppConfig::default(), dir.path(), None, Version::Old).unwrap();
        let paths: Vec<_> = parsed.document.segments().iter().map(|s| s.path().to_string()).collect();
        assert_eq!(paths, vec!["a.md:1", "a.md:1.1", "b.md:1"]);
        assert_eq!(parsed.policy_label(), "per-file");
        assert_eq!(parsed.document.version(), Version::Old);
    }

    #[test]
    fn test_directory_input_uses_configured_policy() {
        let dir = snapshot(&[("doc.md", "# Title\n\nfirst\n\nsecond\n")]);
        let config = AppConfig::builder()
            .policy(SegmentationPolicy::Paragraphs)
            .build();
        let policy = resolve_input_policy(&config, dir.path());
        let parsed = parse_input(&config, dir.path(), policy, Version::New).unwrap();
        assert_eq!(parsed.document.len(), 3);
        assert_eq!(parsed.policy_label(), "paragraphs");
    }

    #[test]
    fn test_file_input_detects_policy() {
        let dir = snapshot(&[("lib.py", "def f():\n    return 1\n")]);
        let file = dir.path().join("lib.py");
        assert_eq!(
            resolve_input_policy(&AppConfig::default(), &file),
            Some(SegmentationPolicy::Python)
        );
        assert_eq!(resolve_input_policy(&AppConfig::default(), dir.path()), None);
        let parsed = parse_input(&AppConfig::default(), &file, None, Version::Old).unwrap();
        assert_eq!(parsed.policy_label(), "python");
        assert_eq!(parsed.document.segments()[0].path(), "def f");
    }

    #[test]
    fn test_parse_inputs_mixes_files_and_directories() {
        let dir = snapshot(&[("docs/a.md", "# A\n"), ("notes.md", "# N\n")]);
        let inputs = vec![dir.path().join("docs"), dir.path().join("notes.md")];
        let parsed = parse_inputs(&AppConfig::default(), &inputs, Version::Old).unwrap();
        assert_eq!(parsed.document.len(), 2);
        assert!(parsed.document.segments()[0].path().ends_with("a.md:1"));
        assert!(parsed.document.segments()[1].path().ends_with("notes.md:1"));
    }
}
