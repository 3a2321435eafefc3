//! Report type definitions.

use crate::addressing::{ContentAddresser, Fingerprint};
use crate::model::{Document, SegmentKind};
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Auto-detect: table if TTY, summary otherwise
    #[default]
    Auto,
    /// Structured JSON output
    Json,
    /// Brief summary output
    Summary,
    /// Aligned table of entries for terminal (colored)
    Table,
    /// Comma-separated values
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Json => write!(f, "json"),
            Self::Summary => write!(f, "summary"),
            Self::Table => write!(f, "table"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Configuration for report generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include unchanged entries in human-readable reports
    pub include_unchanged: bool,
    /// Additional metadata to include
    pub metadata: ReportMetadata,
}

/// Metadata included in reports
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Old document path
    pub old_path: Option<String>,
    /// New document path
    pub new_path: Option<String>,
    /// Inputs searched by a similarity report
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Segmentation policy used for both documents
    pub policy: Option<String>,
    /// Embedding model name
    pub model: Option<String>,
    /// Effective similarity threshold
    pub threshold: Option<f64>,
    /// Tool version
    pub tool_version: String,
}

impl ReportMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        }
    }
}

/// One row of a segment listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentRow {
    pub index: usize,
    pub path: String,
    pub kind: SegmentKind,
    pub fingerprint: Fingerprint,
    pub start_line: usize,
    pub end_line: usize,
    /// First non-blank line of the segment
    pub preview: String,
}

/// Segments of a single document with their fingerprints.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentListing {
    pub name: Option<String>,
    pub policy: String,
    pub segments: Vec<SegmentRow>,
}

impl SegmentListing {
    /// Fingerprint every segment of `document`.
    #[must_use]
    pub fn from_document(
        document: &Document,
        policy: impl Into<String>,
        addresser: &ContentAddresser,
    ) -> Self {
        let segments = document
            .segments()
            .iter()
            .map(|s| SegmentRow {
                index: s.index(),
                path: s.path().to_string(),
                kind: s.kind,
                fingerprint: addresser.fingerprint(&s.content),
                start_line: s.start_line,
                end_line: s.end_line,
                preview: s
                    .content
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .unwrap_or("")
                    .to_string(),
            })
            .collect();
        Self {
            name: document.name().map(str::to_string),
            policy: policy.into(),
            segments,
        }
    }
}
