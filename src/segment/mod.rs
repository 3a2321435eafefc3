//! Document segmentation.
//!
//! A [`Segmenter`] splits raw content into an ordered sequence of
//! non-overlapping [`Segment`]s under a [`SegmentationPolicy`]. Position
//! labels come from the structural hierarchy (heading outline, definition
//! names) so they stay stable under edits elsewhere in the file. Malformed
//! input is an error; no segment is ever dropped silently.
//!
//! # Example
//!
//! ```
//! use mdbed::model::Version;
//! use mdbed::segment::{segment_document, SegmentationPolicy};
//!
//! let doc = segment_document(
//!     "# Intro\nhello\n\n# Usage\nrun it\n",
//!     SegmentationPolicy::MarkdownSections,
//!     Version::Old,
//! )?;
//! assert_eq!(doc.len(), 2);
//! assert_eq!(doc.segments()[1].path(), "2");
//! # Ok::<(), mdbed::MdbedError>(())
//! ```

mod code;
mod markdown;
mod text;

pub use code::{CodeLanguage, CodeSegmenter};
pub use markdown::{MarkdownBlockSegmenter, MarkdownSectionSegmenter};
pub use text::ParagraphSegmenter;

use crate::error::{MdbedError, Result, SegmentationErrorKind};
use crate::model::{Document, Segment, Version};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Splits raw content into segments.
pub trait Segmenter: Send + Sync {
    /// Segment `source` into ordered, non-overlapping segments.
    fn segment(&self, source: &str) -> std::result::Result<Vec<Segment>, SegmentationErrorKind>;

    /// Name of the policy this segmenter implements.
    fn name(&self) -> &'static str;
}

/// Structural decomposition policy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentationPolicy {
    /// One segment per markdown heading section
    #[default]
    MarkdownSections,
    /// One segment per markdown leaf block (heading, paragraph, list item, quote, code)
    MarkdownBlocks,
    /// Blank-line separated paragraphs
    Paragraphs,
    /// One segment per top-level Python function or class
    Python,
    /// One segment per top-level Rust item
    Rust,
}

impl SegmentationPolicy {
    /// Pick a policy from a file extension.
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("md" | "markdown" | "mdx") => Self::MarkdownSections,
            Some("py" | "pyi") => Self::Python,
            Some("rs") => Self::Rust,
            _ => Self::Paragraphs,
        }
    }

    /// Build the segmenter for this policy.
    #[must_use]
    pub fn segmenter(self) -> Box<dyn Segmenter> {
        match self {
            Self::MarkdownSections => Box::new(MarkdownSectionSegmenter),
            Self::MarkdownBlocks => Box::new(MarkdownBlockSegmenter),
            Self::Paragraphs => Box::new(ParagraphSegmenter),
            Self::Python => Box::new(CodeSegmenter::new(CodeLanguage::Python)),
            Self::Rust => Box::new(CodeSegmenter::new(CodeLanguage::Rust)),
        }
    }
}

impl std::fmt::Display for SegmentationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::MarkdownSections => "markdown-sections",
            Self::MarkdownBlocks => "markdown-blocks",
            Self::Paragraphs => "paragraphs",
            Self::Python => "python",
            Self::Rust => "rust",
        };
        write!(f, "{s}")
    }
}

/// Segment raw content into a [`Document`].
pub fn segment_document(
    source: &str,
    policy: SegmentationPolicy,
    version: Version,
) -> Result<Document> {
    let segmenter = policy.segmenter();
    let segments = segmenter
        .segment(source)
        .map_err(|kind| MdbedError::segmentation(format!("{version} document ({policy})"), kind))?;
    tracing::debug!(
        policy = %policy,
        version = %version,
        segments = segments.len(),
        "segmented document"
    );
    Ok(Document::new(version, segments))
}

/// Trim leading and trailing blank lines from a line range.
///
/// Returns `None` when every line in the range is blank.
pub(crate) fn trim_blank(lines: &[&str], start: usize, end: usize) -> Option<(usize, usize)> {
    let first = (start..end).find(|&i| !lines[i].trim().is_empty())?;
    let last = (start..end).rev().find(|&i| !lines[i].trim().is_empty())?;
    Some((first, last + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_policy() {
        assert_eq!(
            SegmentationPolicy::detect(Path::new("docs/README.md")),
            SegmentationPolicy::MarkdownSections
        );
        assert_eq!(
            SegmentationPolicy::detect(Path::new("pkg/mod.PY")),
            SegmentationPolicy::Python
        );
        assert_eq!(
            SegmentationPolicy::detect(Path::new("src/lib.rs")),
            SegmentationPolicy::Rust
        );
        assert_eq!(
            SegmentationPolicy::detect(Path::new("notes.txt")),
            SegmentationPolicy::Paragraphs
        );
    }

    #[test]
    fn test_segment_document_wraps_errors() {
        let err = segment_document("```\nunterminated", SegmentationPolicy::MarkdownSections, Version::New)
            .unwrap_err();
        assert!(matches!(err, MdbedError::Segmentation { .. }));
        assert!(err.to_string().contains("new document"));
    }

    #[test]
    fn test_trim_blank() {
        let lines = vec!["", "a", "", "b", " "];
        assert_eq!(trim_blank(&lines, 0, lines.len()), Some((1, 4)));
        assert_eq!(trim_blank(&lines, 4, 5), None);
    }
}
