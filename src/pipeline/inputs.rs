//! Input path expansion.
//!
//! Explicit file arguments are always taken as given. Directory arguments
//! are walked (respecting `.gitignore`) and contribute the files whose name
//! matches the configured filter.

use crate::config::SegmentationConfig;
use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use indexmap::IndexSet;
use regex::Regex;
use std::path::{Path, PathBuf};

/// File names picked up from directories when no filter is configured.
pub const DEFAULT_NAME_FILTER: &str = r"(?i)\.(md|markdown|mdx)$";

/// Compile the configured file name filter.
pub fn name_filter(config: &SegmentationConfig) -> Result<Regex> {
    let pattern = config.filter.as_deref().unwrap_or(DEFAULT_NAME_FILTER);
    Regex::new(pattern).with_context(|| format!("Invalid file name pattern: {pattern}"))
}

/// Files under `dir` whose name matches `filter`, sorted by path.
///
/// Without `recursive` only the direct children are considered.
pub fn walk_directory(dir: &Path, recursive: bool, filter: &Regex) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(dir);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .max_depth(if recursive { None } else { Some(1) })
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let matches = entry
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| filter.is_match(n));
        if matches {
            files.push(entry.into_path());
        } else {
            tracing::trace!("Skipping {}", entry.path().display());
        }
    }
    Ok(files)
}

/// Expand file and directory arguments into a de-duplicated file list,
/// keeping argument order.
pub fn collect_files(paths: &[PathBuf], config: &SegmentationConfig) -> Result<Vec<PathBuf>> {
    let filter = name_filter(config)?;
    let mut files = IndexSet::new();
    for path in paths {
        if path.is_dir() {
            files.extend(walk_directory(path, config.recursive, &filter)?);
        } else if path.is_file() {
            files.insert(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }
    tracing::debug!("Collected {} input files", files.len());
    Ok(files.into_iter().collect())
}
