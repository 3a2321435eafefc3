//! Core document and segment data structures.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which side of a comparison a document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Old,
    New,
}

impl Version {
    /// The opposite side.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Old => Self::New,
            Self::New => Self::Old,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Old => write!(f, "old"),
            Self::New => write!(f, "new"),
        }
    }
}

/// Structural role of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    /// Text before the first heading of a markdown document
    Preamble,
    /// A heading together with its body
    Section,
    Heading,
    Paragraph,
    ListItem,
    Blockquote,
    CodeBlock,
    /// Raw HTML block in markdown
    Html,
    /// A top-level function, class, or item in source code
    Definition,
    /// A run of top-level statements that are not definitions
    Module,
    /// Segment supplied by the caller without structural information
    Text,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Preamble => "preamble",
            Self::Section => "section",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::ListItem => "list-item",
            Self::Blockquote => "blockquote",
            Self::CodeBlock => "code-block",
            Self::Html => "html",
            Self::Definition => "definition",
            Self::Module => "module",
            Self::Text => "text",
        };
        write!(f, "{s}")
    }
}

/// Location of a segment within its document.
///
/// `index` is the ordinal of the segment in document order and is what
/// "same position" means for classification. `path` is a label derived from
/// the structural hierarchy (heading outline, definition name), never from
/// byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub index: usize,
    pub path: String,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.index, self.path)
    }
}

/// A unit of document content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub position: Position,
    pub kind: SegmentKind,
    /// Raw text of the segment
    pub content: String,
    /// First source line (1-based), informational only
    pub start_line: usize,
    /// Last source line (1-based, inclusive), informational only
    pub end_line: usize,
}

impl Segment {
    /// Create a segment. The index is assigned when the segment is placed
    /// into a [`Document`].
    pub fn new(
        path: impl Into<String>,
        kind: SegmentKind,
        content: impl Into<String>,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        Self {
            position: Position {
                index: 0,
                path: path.into(),
            },
            kind,
            content: content.into(),
            start_line,
            end_line,
        }
    }

    /// Position index within the document.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.position.index
    }

    /// Structural path label.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.position.path
    }
}

/// An immutable, ordered sequence of segments.
///
/// Deserialized documents go through [`Document::new`], so stored position
/// indices are reassigned from segment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DocumentRecord")]
pub struct Document {
    version: Version,
    /// Optional human-readable name (usually the source path)
    name: Option<String>,
    segments: Vec<Segment>,
}

impl Document {
    /// Build a document, assigning position indices in iteration order.
    ///
    /// Duplicate path labels are disambiguated with a `#n` suffix so every
    /// segment is uniquely positioned by both index and path.
    pub fn new(version: Version, segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let segments = segments
            .into_iter()
            .enumerate()
            .map(|(index, mut segment)| {
                segment.position.index = index;
                let count = seen.entry(segment.position.path.clone()).or_insert(0);
                *count += 1;
                if *count > 1 {
                    segment.position.path = format!("{}#{}", segment.position.path, count);
                }
                segment
            })
            .collect();

        Self {
            version,
            name: None,
            segments,
        }
    }

    /// Join several documents into one, prefixing every path label with the
    /// label of the part it came from (`guide.md:1.2`).
    pub fn concat(version: Version, parts: impl IntoIterator<Item = (String, Document)>) -> Self {
        Self::new(
            version,
            parts.into_iter().flat_map(|(label, document)| {
                document.segments.into_iter().map(move |mut segment| {
                    segment.position.path = format!("{label}:{}", segment.position.path);
                    segment
                })
            }),
        )
    }

    /// Build a document from pre-split texts, one segment per text.
    pub fn from_texts<S: AsRef<str>>(version: Version, texts: &[S]) -> Self {
        Self::new(
            version,
            texts.iter().enumerate().map(|(i, text)| {
                let text = text.as_ref();
                let lines = text.lines().count().max(1);
                Segment::new(format!("s[{i}]"), SegmentKind::Text, text, 1, lines)
            }),
        )
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The same segments relabelled as the other version.
    #[must_use]
    pub fn relabel(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Serialized form of a [`Document`], before indices are normalized.
#[derive(Deserialize)]
struct DocumentRecord {
    version: Version,
    #[serde(default)]
    name: Option<String>,
    segments: Vec<Segment>,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        let document = Self::new(record.version, record.segments);
        match record.name {
            Some(name) => document.with_name(name),
            None => document,
        }
    }
}
