//! Diff report types.

use crate::addressing::Fingerprint;
use crate::model::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffKind {
    /// Identical content at the same position
    #[serde(rename = "unchanged")]
    Unchanged,
    /// Identical content at a different position
    #[serde(rename = "moved")]
    Moved,
    /// Similar content at the same position
    #[serde(rename = "modified")]
    Modified,
    /// Similar content at a different position
    #[serde(rename = "moved+modified")]
    MovedModified,
    /// Present only in the new document
    #[serde(rename = "added")]
    Added,
    /// Present only in the old document
    #[serde(rename = "removed")]
    Removed,
}

impl DiffKind {
    /// Stable label, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Moved => "moved",
            Self::Modified => "modified",
            Self::MovedModified => "moved+modified",
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }

    /// Whether this entry counts towards `total_changes`.
    #[must_use]
    pub const fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// The kind seen when old and new are swapped.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        match self {
            Self::Added => Self::Removed,
            Self::Removed => Self::Added,
            other => other,
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a line change inside a matched segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineChangeKind {
    Insert,
    Delete,
}

/// A line-level change, addressed relative to the start of its segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChange {
    pub kind: LineChangeKind,
    /// Zero-based line offset within the old segment (deletions)
    pub old_offset: Option<usize>,
    /// Zero-based line offset within the new segment (insertions)
    pub new_offset: Option<usize>,
    pub text: String,
}

/// One entry of a [`DiffReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub kind: DiffKind,
    pub old_position: Option<usize>,
    pub new_position: Option<usize>,
    /// 1.0 for exact matches, cosine similarity for fuzzy ones, absent for
    /// added and removed entries
    pub similarity: Option<f64>,
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_changes: Vec<LineChange>,
}

impl DiffEntry {
    pub(crate) fn added(new_position: usize, new_path: &str) -> Self {
        Self {
            kind: DiffKind::Added,
            old_position: None,
            new_position: Some(new_position),
            similarity: None,
            old_path: None,
            new_path: Some(new_path.to_string()),
            line_changes: Vec::new(),
        }
    }

    pub(crate) fn removed(old_position: usize, old_path: &str) -> Self {
        Self {
            kind: DiffKind::Removed,
            old_position: Some(old_position),
            new_position: None,
            similarity: None,
            old_path: Some(old_path.to_string()),
            new_path: None,
            line_changes: Vec::new(),
        }
    }

    /// Best available label for display.
    #[must_use]
    pub fn label(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("")
    }
}

/// Counts per classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total_changes: usize,
    pub unchanged: usize,
    pub moved: usize,
    pub modified: usize,
    pub moved_modified: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffSummary {
    /// Tally a list of entries.
    #[must_use]
    pub fn from_entries(entries: &[DiffEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.kind {
                DiffKind::Unchanged => summary.unchanged += 1,
                DiffKind::Moved => summary.moved += 1,
                DiffKind::Modified => summary.modified += 1,
                DiffKind::MovedModified => summary.moved_modified += 1,
                DiffKind::Added => summary.added += 1,
                DiffKind::Removed => summary.removed += 1,
            }
        }
        summary.total_changes = summary.moved
            + summary.modified
            + summary.moved_modified
            + summary.added
            + summary.removed;
        summary
    }
}

/// A segment whose embedding could not be obtained.
///
/// Its `added` or `removed` entry may hide a match the provider would have
/// found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub version: Version,
    pub position: usize,
    pub path: String,
    pub fingerprint: Fingerprint,
    pub message: String,
}

/// Result of comparing two documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    pub entries: Vec<DiffEntry>,
    pub summary: DiffSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReportWarning>,
}

impl DiffReport {
    /// Create a report from ordered entries and compute the summary.
    #[must_use]
    pub fn new(entries: Vec<DiffEntry>, warnings: Vec<ReportWarning>) -> Self {
        let mut report = Self {
            entries,
            summary: DiffSummary::default(),
            warnings,
        };
        report.calculate_summary();
        report
    }

    /// Recompute summary counts from the entries.
    pub fn calculate_summary(&mut self) {
        self.summary = DiffSummary::from_entries(&self.entries);
    }

    /// Check if there are any changes
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.summary.total_changes > 0
    }

    /// Entries other than `unchanged`.
    pub fn changes(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.kind.is_change())
    }

    /// Entries of one kind, in report order.
    pub fn entries_of(&self, kind: DiffKind) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}
