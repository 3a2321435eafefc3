//! **Content-addressed semantic diff for restructured documents.**
//!
//! `mdbed` compares two versions of a document after splitting each into
//! segments: markdown sections or blocks, blank-line paragraphs, or the
//! top-level items of Python and Rust source. Segments with identical content
//! are paired by fingerprint. The remainder is paired by embedding similarity,
//! so a paragraph that was moved and lightly reworded still shows up as one
//! change instead of a deletion plus an insertion.
//!
//! ## Core Concepts & Modules
//!
//! - **[`segment`]**: Splits source text into a [`Document`] according to a
//!   [`SegmentationPolicy`].
//! - **[`addressing`]**: Fingerprints segment content with xxh3, optionally
//!   ignoring insignificant whitespace.
//! - **[`embedding`]**: The [`EmbeddingProvider`] trait, the built-in
//!   [`HashEmbedder`], an HTTP provider, and the fingerprint-keyed
//!   [`EmbeddingCache`] with its file-backed store.
//! - **[`matching`]**: Exact matching by fingerprint, then thresholded
//!   similarity matching with a one-to-one assignment.
//! - **[`diff`]**: The [`DiffEngine`], which classifies every segment as
//!   unchanged, moved, modified, moved+modified, added, or removed, and can
//!   list near-duplicate segments within a single document.
//! - **[`reports`]**: JSON, summary, table, and CSV renderers.
//! - **[`pipeline`]** and **[`cli`]**: File-level orchestration used by the
//!   `mdbed` binary.
//!
//! ## Diffing Two Documents
//!
//! ```
//! use mdbed::{DiffEngine, DiffKind, EmbeddingCache, HashEmbedder, SegmentationPolicy};
//! use mdbed::embedding::CancellationToken;
//!
//! let old = "# Install\n\nRun the installer.\n\n# Usage\n\nCall the tool.\n";
//! let new = "# Usage\n\nCall the tool.\n\n# Install\n\nRun the installer.\n";
//!
//! let report = DiffEngine::new()
//!     .compare_sources(
//!         old,
//!         new,
//!         SegmentationPolicy::MarkdownSections,
//!         &HashEmbedder::default(),
//!         &EmbeddingCache::new(),
//!         &CancellationToken::new(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(report.entries_of(DiffKind::Moved).count(), 2);
//! assert_eq!(report.summary.added, 0);
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Index/float casts in scoring and table layout are bounded in practice
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    // Variable names like `old`/`new` are clear in context
    clippy::similar_names
)]

pub mod addressing;
pub mod cli;
pub mod config;
pub mod diff;
pub mod embedding;
pub mod error;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod segment;

// Re-export main types for convenience
pub use addressing::{ContentAddresser, Fingerprint};
pub use config::{AppConfig, AppConfigBuilder, ConfigPreset};
pub use config::{ConfigError, Validatable};
pub use diff::{DiffEngine, DiffEntry, DiffKind, DiffReport, DiffSummary, SimilarReport};
pub use embedding::{EmbeddingCache, EmbeddingProvider, HashEmbedder};
pub use error::{MdbedError, Result};
pub use matching::{MatchConfig, SimilarityMatcher};
pub use model::{Document, Segment, Version};
pub use reports::{ReportFormat, ReportGenerator};
pub use segment::{segment_document, SegmentationPolicy};
